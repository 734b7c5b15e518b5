//! Structured "advanced" question types.
//!
//! Each question type carries its own correct-answer payload and its own
//! student-answer shape. Both sides are tagged by `question_type`, and
//! [`validate_advanced_question`] dispatches on the pair. Unknown types and
//! mismatched pairs fail closed with a zero score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validate::FieldValidator;

pub mod common_binyan;
pub mod components;
pub mod multi_stage;
pub mod verb_pairs;

pub use common_binyan::{CommonBinyanAnswer, CommonBinyanKey, CommonBinyanQuestion, RootAnswer};
pub use components::{ComponentsAnswer, ComponentsKey, ComponentsQuestion, GrammarComponent};
pub use multi_stage::{
    MultiStageAnswer, MultiStageKey, MultiStageQuestion, VerbAnalysis, WordRef,
};
pub use verb_pairs::{PairVerb, VerbPair, VerbPairsAnswer, VerbPairsQuestion};

/// A question definition with its correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum AdvancedQuestion {
    CompareVerbPairs(VerbPairsQuestion),
    MultiStageAnalysis(MultiStageQuestion),
    CommonBinyanAndRoots(CommonBinyanQuestion),
    CompareGrammaticalComponents(ComponentsQuestion),
    /// Any `question_type` this engine does not know.
    #[serde(other)]
    Unsupported,
}

impl AdvancedQuestion {
    pub fn question_type(&self) -> &'static str {
        match self {
            AdvancedQuestion::CompareVerbPairs(_) => "compare_verb_pairs",
            AdvancedQuestion::MultiStageAnalysis(_) => "multi_stage_analysis",
            AdvancedQuestion::CommonBinyanAndRoots(_) => "common_binyan_and_roots",
            AdvancedQuestion::CompareGrammaticalComponents(_) => "compare_grammatical_components",
            AdvancedQuestion::Unsupported => "unsupported",
        }
    }

    /// True when the stored correct answer gives nothing to grade against.
    pub fn has_empty_key(&self) -> bool {
        match self {
            AdvancedQuestion::CompareVerbPairs(q) => q.correct_answer.is_none(),
            AdvancedQuestion::MultiStageAnalysis(q) => q.correct_answer.is_empty(),
            AdvancedQuestion::CommonBinyanAndRoots(q) => {
                q.correct_answer.binyan.trim().is_empty() && q.correct_answer.roots.is_empty()
            }
            AdvancedQuestion::CompareGrammaticalComponents(q) => {
                q.correct_answer.components.is_empty()
            }
            AdvancedQuestion::Unsupported => true,
        }
    }
}

/// A student's structured answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum AdvancedAnswer {
    CompareVerbPairs(VerbPairsAnswer),
    MultiStageAnalysis(MultiStageAnswer),
    CommonBinyanAndRoots(CommonBinyanAnswer),
    CompareGrammaticalComponents(ComponentsAnswer),
    #[serde(other)]
    Unsupported,
}

impl AdvancedAnswer {
    pub fn question_type(&self) -> &'static str {
        match self {
            AdvancedAnswer::CompareVerbPairs(_) => "compare_verb_pairs",
            AdvancedAnswer::MultiStageAnalysis(_) => "multi_stage_analysis",
            AdvancedAnswer::CommonBinyanAndRoots(_) => "common_binyan_and_roots",
            AdvancedAnswer::CompareGrammaticalComponents(_) => "compare_grammatical_components",
            AdvancedAnswer::Unsupported => "unsupported",
        }
    }
}

/// Result of grading one advanced question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOutcome {
    pub correct: bool,
    /// 0..=10
    pub score: f64,
    /// Per-part scores shown alongside the total.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub partial_scores: BTreeMap<String, f64>,
}

impl AdvancedOutcome {
    pub fn new(correct: bool, score: f64) -> Self {
        Self {
            correct,
            score,
            partial_scores: BTreeMap::new(),
        }
    }

    /// `{correct: false, score: 0}`.
    pub fn fail_closed() -> Self {
        Self::new(false, 0.0)
    }

    pub fn with_partial(mut self, part: &str, score: f64) -> Self {
        self.partial_scores.insert(part.to_string(), score);
        self
    }
}

/// A sentence shown as part of an advanced question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSentence {
    #[serde(default)]
    pub sentence_number: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub highlighted_word: String,
}

/// Grade an advanced answer against its question.
///
/// Never fails: an unknown type or an answer shaped for a different type
/// scores `{correct: false, score: 0}`.
pub fn validate_advanced_question(
    validator: &FieldValidator<'_>,
    question: &AdvancedQuestion,
    answer: &AdvancedAnswer,
) -> AdvancedOutcome {
    match (question, answer) {
        (AdvancedQuestion::CompareVerbPairs(q), AdvancedAnswer::CompareVerbPairs(a)) => {
            verb_pairs::score(q, a)
        }
        (AdvancedQuestion::MultiStageAnalysis(q), AdvancedAnswer::MultiStageAnalysis(a)) => {
            multi_stage::score(validator, q, a)
        }
        (AdvancedQuestion::CommonBinyanAndRoots(q), AdvancedAnswer::CommonBinyanAndRoots(a)) => {
            common_binyan::score(validator, q, a)
        }
        (
            AdvancedQuestion::CompareGrammaticalComponents(q),
            AdvancedAnswer::CompareGrammaticalComponents(a),
        ) => components::score(q, a),
        (AdvancedQuestion::Unsupported, _) => {
            tracing::warn!("unsupported question type, scoring 0");
            AdvancedOutcome::fail_closed()
        }
        (q, a) => {
            tracing::warn!(
                "answer type '{}' does not match question type '{}', scoring 0",
                a.question_type(),
                q.question_type()
            );
            AdvancedOutcome::fail_closed()
        }
    }
}
