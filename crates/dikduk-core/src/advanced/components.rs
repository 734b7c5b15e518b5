//! `compare_grammatical_components`: which components do the highlighted words share?
//!
//! Scored as recall over the expected set. Selecting extra components is
//! not penalized.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AdvancedOutcome, QuestionSentence};
use crate::normalize::normalize;
use crate::model::null_as_default;
use crate::scoring::SENTENCE_POINTS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentsQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruction: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentences: Vec<QuestionSentence>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: ComponentsKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentsKey {
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentsAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_components: Vec<String>,
}

/// A component name, canonicalized from Hebrew or English spellings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrammarComponent {
    Shoresh,
    Binyan,
    Zman,
    Guf,
    Other(String),
}

impl GrammarComponent {
    /// Matching happens on the normalized name, so final letters are folded.
    pub fn parse(name: &str) -> Self {
        let n = normalize(name);
        match n.as_str() {
            "שורש" | "שרש" | "shoresh" | "root" => GrammarComponent::Shoresh,
            "בניינ" | "בנינ" | "binyan" => GrammarComponent::Binyan,
            "זמנ" | "zman" | "tense" => GrammarComponent::Zman,
            "גופ" | "guf" | "person" => GrammarComponent::Guf,
            _ => GrammarComponent::Other(n),
        }
    }
}

impl fmt::Display for GrammarComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarComponent::Shoresh => write!(f, "שורש"),
            GrammarComponent::Binyan => write!(f, "בניין"),
            GrammarComponent::Zman => write!(f, "זמן"),
            GrammarComponent::Guf => write!(f, "גוף"),
            GrammarComponent::Other(s) => write!(f, "{s}"),
        }
    }
}

fn component_set(names: &[String]) -> BTreeSet<GrammarComponent> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .map(|n| GrammarComponent::parse(n))
        .collect()
}

pub(crate) fn score(question: &ComponentsQuestion, answer: &ComponentsAnswer) -> AdvancedOutcome {
    let expected = component_set(&question.correct_answer.components);
    if expected.is_empty() {
        return AdvancedOutcome::new(true, SENTENCE_POINTS);
    }
    let selected = component_set(&answer.selected_components);
    let found = expected.intersection(&selected).count();
    AdvancedOutcome::new(
        found == expected.len(),
        found as f64 / expected.len() as f64 * SENTENCE_POINTS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(components: &[&str]) -> ComponentsQuestion {
        ComponentsQuestion {
            correct_answer: ComponentsKey {
                components: components.iter().map(|s| s.to_string()).collect(),
            },
            ..Default::default()
        }
    }

    fn select(components: &[&str]) -> ComponentsAnswer {
        ComponentsAnswer {
            selected_components: components.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn exact_selection() {
        let outcome = score(&question(&["שורש", "בניין"]), &select(&["בניין", "שורש"]));
        assert!(outcome.correct);
        assert_eq!(outcome.score, 10.0);
    }

    #[test]
    fn superset_is_still_full_marks() {
        let outcome = score(
            &question(&["שורש", "בניין"]),
            &select(&["שורש", "בניין", "זמן", "גוף"]),
        );
        assert!(outcome.correct);
        assert_eq!(outcome.score, 10.0);
    }

    #[test]
    fn partial_recall() {
        let outcome = score(&question(&["שורש", "בניין", "זמן", "גוף"]), &select(&["זמן"]));
        assert!(!outcome.correct);
        assert_eq!(outcome.score, 2.5);
    }

    #[test]
    fn english_and_defective_spellings_are_canonicalized() {
        let outcome = score(&question(&["שורש", "בניין"]), &select(&["root", "בנין"]));
        assert!(outcome.correct);
    }

    #[test]
    fn duplicates_in_key_count_once() {
        let outcome = score(&question(&["גוף", "גוף", "guf"]), &select(&["גוף"]));
        assert!(outcome.correct);
        assert_eq!(outcome.score, 10.0);
    }

    #[test]
    fn empty_key_is_vacuous() {
        let outcome = score(&question(&[]), &select(&[]));
        assert!(outcome.correct);
        assert_eq!(outcome.score, 10.0);
    }

    #[test]
    fn nothing_selected() {
        let outcome = score(&question(&["זמן"]), &select(&[]));
        assert!(!outcome.correct);
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn display_uses_hebrew_names() {
        assert_eq!(GrammarComponent::parse("tense").to_string(), "זמן");
        assert_eq!(GrammarComponent::parse("משקל").to_string(), "משקל");
    }
}
