//! `compare_verb_pairs`: pick the odd pair out.

use serde::{Deserialize, Serialize};

use super::AdvancedOutcome;
use crate::model::null_as_default;
use crate::scoring::SENTENCE_POINTS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbPairsQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruction: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pairs: Vec<VerbPair>,
    /// Number of the pair that differs from the others.
    #[serde(default)]
    pub correct_answer: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbPair {
    pub pair_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb1: PairVerb,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb2: PairVerb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence1_full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence2_full: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairVerb {
    #[serde(default, deserialize_with = "null_as_default")]
    pub word: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentence: String,
}

/// The student's pick, plus the binyan notes recorded alongside it.
///
/// Only `selected_pair` is graded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbPairsAnswer {
    #[serde(default)]
    pub selected_pair: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb1_binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verb2_binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub other_pairs_binyan: String,
}

/// All or nothing: 10 for the right pair, 0 otherwise.
pub(crate) fn score(question: &VerbPairsQuestion, answer: &VerbPairsAnswer) -> AdvancedOutcome {
    let correct = matches!(
        (question.correct_answer, answer.selected_pair),
        (Some(expected), Some(selected)) if expected == selected
    );
    AdvancedOutcome::new(correct, if correct { SENTENCE_POINTS } else { 0.0 })
}
