//! `common_binyan_and_roots`: name the shared binyan, then give each verb's root.

use serde::{Deserialize, Serialize};

use super::{AdvancedOutcome, QuestionSentence};
use crate::model::null_as_default;
use crate::scoring::SENTENCE_POINTS;
use crate::validate::FieldValidator;

/// The binyan and the roots are each worth half the question.
const PART_POINTS: f64 = SENTENCE_POINTS / 2.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonBinyanQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruction: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentences: Vec<QuestionSentence>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: CommonBinyanKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonBinyanKey {
    #[serde(default, deserialize_with = "null_as_default")]
    pub binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roots: Vec<RootAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentence: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shoresh: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonBinyanAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roots: Vec<RootAnswer>,
}

impl CommonBinyanAnswer {
    /// First root the student gave for a sentence.
    fn root_for(&self, sentence: u32) -> Option<&str> {
        self.roots
            .iter()
            .find(|r| r.sentence == sentence)
            .map(|r| r.shoresh.as_str())
    }
}

pub(crate) fn score(
    validator: &FieldValidator<'_>,
    question: &CommonBinyanQuestion,
    answer: &CommonBinyanAnswer,
) -> AdvancedOutcome {
    let key = &question.correct_answer;

    let binyan_ok = validator.validate_binyan(&answer.common_binyan, &key.binyan);
    let binyan_score = if binyan_ok { PART_POINTS } else { 0.0 };

    let (roots_ok, roots_score) = if key.roots.is_empty() {
        (true, PART_POINTS)
    } else {
        let matched = key
            .roots
            .iter()
            .filter(|expected| {
                answer
                    .root_for(expected.sentence)
                    .is_some_and(|given| validator.validate_shoresh(given, &expected.shoresh))
            })
            .count();
        (
            matched == key.roots.len(),
            matched as f64 * PART_POINTS / key.roots.len() as f64,
        )
    };

    AdvancedOutcome::new(binyan_ok && roots_ok, binyan_score + roots_score)
        .with_partial("binyan", binyan_score)
        .with_partial("roots", roots_score)
}
