//! `multi_stage_analysis`: find the verbs, find the infinitives, analyse the rest.
//!
//! Three parts are scored independently on 0..=10 and averaged without
//! weighting. Parts A and B measure how much of the expected selection the
//! student found; extra picks neither help nor hurt. Part C checks shoresh
//! and binyan through the field validators, but the "form" field is a plain
//! normalized comparison with no variant table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AdvancedOutcome, QuestionSentence};
use crate::normalize::normalize;
use crate::model::null_as_default;
use crate::scoring::SENTENCE_POINTS;
use crate::validate::FieldValidator;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStageQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instruction: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentences: Vec<QuestionSentence>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct_answer: MultiStageKey,
}

/// Expected selections and analyses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStageKey {
    #[serde(default, deserialize_with = "null_as_default")]
    pub verbs: Vec<WordRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub infinitives: Vec<WordRef>,
    /// Keyed by `{sentence_number}_{word}`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub analyses: BTreeMap<String, VerbAnalysis>,
}

impl MultiStageKey {
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty() && self.infinitives.is_empty() && self.analyses.is_empty()
    }
}

/// A word picked from a numbered sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentence: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub word: String,
}

impl WordRef {
    pub fn new(sentence: u32, word: impl Into<String>) -> Self {
        Self {
            sentence,
            word: word.into(),
        }
    }

    /// Same sentence, same word after normalization.
    pub fn matches(&self, other: &WordRef) -> bool {
        self.sentence == other.sentence && normalize(&self.word) == normalize(&other.word)
    }

    /// The part C analysis key for this word.
    pub fn analysis_key(&self) -> String {
        format!("{}_{}", self.sentence, self.word)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub shoresh: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub form: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStageAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_a: VerbSelection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_b: InfinitiveSelection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_c: AnalysisPart,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbSelection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_verbs: Vec<WordRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfinitiveSelection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_infinitives: Vec<WordRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub analyses: BTreeMap<String, VerbAnalysis>,
}

/// Score for one part.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PartScore {
    correct: bool,
    score: f64,
}

impl PartScore {
    /// Nothing expected: vacuously correct.
    const VACUOUS: PartScore = PartScore {
        correct: true,
        score: SENTENCE_POINTS,
    };
}

/// Recall of `expected` within `selected`.
fn score_selection(selected: &[WordRef], expected: &[WordRef]) -> PartScore {
    if expected.is_empty() {
        return PartScore::VACUOUS;
    }
    let matched = expected
        .iter()
        .filter(|e| selected.iter().any(|s| s.matches(e)))
        .count();
    PartScore {
        correct: matched == expected.len(),
        score: matched as f64 / expected.len() as f64 * SENTENCE_POINTS,
    }
}

/// Find the student's analysis for a key, falling back to a normalized key match.
fn find_analysis<'a>(
    analyses: &'a BTreeMap<String, VerbAnalysis>,
    key: &str,
) -> Option<&'a VerbAnalysis> {
    analyses.get(key).or_else(|| {
        let wanted = normalize(key);
        analyses
            .iter()
            .find(|(k, _)| normalize(k) == wanted)
            .map(|(_, v)| v)
    })
}

fn score_analyses(
    validator: &FieldValidator<'_>,
    submitted: &BTreeMap<String, VerbAnalysis>,
    expected: &BTreeMap<String, VerbAnalysis>,
) -> PartScore {
    if expected.is_empty() {
        return PartScore::VACUOUS;
    }
    let empty = VerbAnalysis::default();
    let mut correct_fields = 0usize;
    for (key, want) in expected {
        let got = find_analysis(submitted, key).unwrap_or(&empty);
        if validator.validate_shoresh(&got.shoresh, &want.shoresh) {
            correct_fields += 1;
        }
        if validator.validate_binyan(&got.binyan, &want.binyan) {
            correct_fields += 1;
        }
        if normalize(&got.form) == normalize(&want.form) {
            correct_fields += 1;
        }
    }
    let possible = 3 * expected.len();
    PartScore {
        correct: correct_fields == possible,
        score: correct_fields as f64 / possible as f64 * SENTENCE_POINTS,
    }
}

pub(crate) fn score(
    validator: &FieldValidator<'_>,
    question: &MultiStageQuestion,
    answer: &MultiStageAnswer,
) -> AdvancedOutcome {
    let key = &question.correct_answer;
    let a = score_selection(&answer.part_a.selected_verbs, &key.verbs);
    let b = score_selection(&answer.part_b.selected_infinitives, &key.infinitives);
    let c = score_analyses(validator, &answer.part_c.analyses, &key.analyses);

    let total = (a.score + b.score + c.score) / 3.0;
    AdvancedOutcome::new(a.correct && b.correct && c.correct, total)
        .with_partial("part_a", a.score)
        .with_partial("part_b", b.score)
        .with_partial("part_c", c.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarConfig;

    fn analysis(shoresh: &str, binyan: &str, form: &str) -> VerbAnalysis {
        VerbAnalysis {
            shoresh: shoresh.into(),
            binyan: binyan.into(),
            form: form.into(),
        }
    }

    fn question() -> MultiStageQuestion {
        let mut analyses = BTreeMap::new();
        analyses.insert("4_כותב".to_string(), analysis("כתב", "פעל", "בינוני"));
        analyses.insert("5_נשמר".to_string(), analysis("שמר", "נפעל", "עבר"));
        MultiStageQuestion {
            instruction: "ניתוח רב-שלבי".into(),
            sentences: vec![],
            correct_answer: MultiStageKey {
                verbs: vec![
                    WordRef::new(1, "הלך"),
                    WordRef::new(2, "ישב"),
                    WordRef::new(3, "דיבר"),
                ],
                infinitives: vec![WordRef::new(6, "לכתוב"), WordRef::new(7, "לשמור")],
                analyses,
            },
        }
    }

    fn perfect_answer() -> MultiStageAnswer {
        let mut analyses = BTreeMap::new();
        analyses.insert("4_כותב".to_string(), analysis("כ.ת.ב", "קל", "בינוני"));
        analyses.insert("5_נשמר".to_string(), analysis("ש-מ-ר", "ניפעל", "עבר"));
        MultiStageAnswer {
            part_a: VerbSelection {
                selected_verbs: vec![
                    WordRef::new(3, "דִּיבֵּר"),
                    WordRef::new(1, "הלך"),
                    WordRef::new(2, "ישב"),
                ],
            },
            part_b: InfinitiveSelection {
                selected_infinitives: vec![WordRef::new(6, "לכתוב"), WordRef::new(7, "לשמור")],
            },
            part_c: AnalysisPart { analyses },
        }
    }

    fn grade(answer: &MultiStageAnswer) -> AdvancedOutcome {
        let grammar = GrammarConfig::builtin();
        let v = FieldValidator::new(&grammar);
        score(&v, &question(), answer)
    }

    #[test]
    fn perfect_answer_scores_ten() {
        let outcome = grade(&perfect_answer());
        assert!(outcome.correct);
        assert!((outcome.score - 10.0).abs() < 1e-9);
        assert_eq!(outcome.partial_scores["part_a"], 10.0);
        assert_eq!(outcome.partial_scores["part_b"], 10.0);
        assert_eq!(outcome.partial_scores["part_c"], 10.0);
    }

    #[test]
    fn selection_counts_only_intersection() {
        let mut answer = perfect_answer();
        answer.part_a.selected_verbs = vec![
            WordRef::new(1, "הלך"),
            WordRef::new(9, "שולחן"),
            WordRef::new(9, "כיסא"),
            WordRef::new(2, "הלך"), // right word, wrong sentence
        ];
        let outcome = grade(&answer);
        assert!(!outcome.correct);
        let part_a = outcome.partial_scores["part_a"];
        assert!((part_a - 10.0 / 3.0).abs() < 1e-9, "got {part_a}");
    }

    #[test]
    fn extra_selections_are_not_penalized() {
        let mut answer = perfect_answer();
        answer
            .part_b
            .selected_infinitives
            .push(WordRef::new(1, "הלך"));
        let outcome = grade(&answer);
        assert_eq!(outcome.partial_scores["part_b"], 10.0);
        assert!(outcome.correct);
    }

    #[test]
    fn form_field_bypasses_variant_table() {
        let mut answer = perfect_answer();
        // "הווה" and "בינוני" are zman synonyms, but form is compared literally.
        answer
            .part_c
            .analyses
            .insert("4_כותב".to_string(), analysis("כתב", "פעל", "הווה"));
        let outcome = grade(&answer);
        let part_c = outcome.partial_scores["part_c"];
        assert!((part_c - 5.0 / 6.0 * 10.0).abs() < 1e-9, "got {part_c}");
        assert!(!outcome.correct);
    }

    #[test]
    fn missing_analysis_counts_all_three_fields_wrong() {
        let mut answer = perfect_answer();
        answer.part_c.analyses.remove("5_נשמר");
        let outcome = grade(&answer);
        assert!((outcome.partial_scores["part_c"] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn analysis_key_lookup_tolerates_pointing() {
        let mut answer = perfect_answer();
        let entry = answer.part_c.analyses.remove("4_כותב").unwrap();
        answer.part_c.analyses.insert("4_כּוֹתֵב".to_string(), entry);
        assert_eq!(grade(&answer).partial_scores["part_c"], 10.0);
    }

    #[test]
    fn empty_part_c_is_vacuously_correct() {
        let grammar = GrammarConfig::builtin();
        let v = FieldValidator::new(&grammar);
        let mut q = question();
        q.correct_answer.analyses.clear();
        let mut answer = perfect_answer();
        answer.part_a.selected_verbs.clear();
        let outcome = score(&v, &q, &answer);
        assert_eq!(outcome.partial_scores["part_a"], 0.0);
        assert_eq!(outcome.partial_scores["part_b"], 10.0);
        assert_eq!(outcome.partial_scores["part_c"], 10.0);
        assert!((outcome.score - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn final_score_is_unweighted_average() {
        let mut answer = perfect_answer();
        answer.part_a.selected_verbs.truncate(1); // 1 of 3
        answer.part_b.selected_infinitives.clear(); // 0 of 2
        let outcome = grade(&answer);
        let expected = (10.0 / 3.0 + 0.0 + 10.0) / 3.0;
        assert!((outcome.score - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_answer_scores_zero() {
        let outcome = grade(&MultiStageAnswer::default());
        assert_eq!(outcome.score, 0.0);
        assert!(!outcome.correct);
    }

    #[test]
    fn word_ref_key_format() {
        assert_eq!(WordRef::new(4, "כותב").analysis_key(), "4_כותב");
    }
}
