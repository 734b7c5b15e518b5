//! Core data model types for dikduk.
//!
//! Answer keys, student answers, per-field correctness, and the assignment
//! structure every other module builds on.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::advanced::{AdvancedAnswer, AdvancedOutcome, AdvancedQuestion};
use crate::normalize::normalize;

/// One of the four analysed dimensions of a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Shoresh,
    Binyan,
    Zman,
    Guf,
}

impl Field {
    /// All fields in display order.
    pub const ALL: [Field; 4] = [Field::Shoresh, Field::Binyan, Field::Zman, Field::Guf];

    /// Hebrew display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Shoresh => "שורש",
            Field::Binyan => "בניין",
            Field::Zman => "זמן",
            Field::Guf => "גוף",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Shoresh => write!(f, "shoresh"),
            Field::Binyan => write!(f, "binyan"),
            Field::Zman => write!(f, "zman"),
            Field::Guf => write!(f, "guf"),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "shoresh" | "root" | "שורש" => Ok(Field::Shoresh),
            "binyan" | "בניינ" | "בנינ" => Ok(Field::Binyan),
            "zman" | "tense" | "זמנ" => Ok(Field::Zman),
            "guf" | "person" | "גופ" => Ok(Field::Guf),
            _ => Err(format!("unknown field: {s}")),
        }
    }
}

/// Ground truth for one basic sentence.
///
/// `None` (or a blank string) for binyan or guf means the field is not
/// required for this sentence, e.g. an infinitive has no person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnswerKey {
    pub correct_shoresh: String,
    #[serde(default)]
    pub correct_binyan: Option<String>,
    pub correct_zman: String,
    #[serde(default)]
    pub correct_guf: Option<String>,
}

impl SentenceAnswerKey {
    /// Which optional fields this sentence requires.
    pub fn required(&self) -> FieldsRequired {
        FieldsRequired {
            has_binyan: present(self.correct_binyan.as_deref()).is_some(),
            has_guf: present(self.correct_guf.as_deref()).is_some(),
        }
    }

    /// The correct answer for a field, `None` when the field is not required.
    pub fn correct(&self, field: Field) -> Option<&str> {
        match field {
            Field::Shoresh => Some(&self.correct_shoresh),
            Field::Binyan => present(self.correct_binyan.as_deref()),
            Field::Zman => Some(&self.correct_zman),
            Field::Guf => present(self.correct_guf.as_deref()),
        }
    }
}

/// Deserialize `null` as the type's default, as stored rows may carry nulls.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat blank strings the same as absent values.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which of the conditionally-required fields apply to a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsRequired {
    pub has_binyan: bool,
    pub has_guf: bool,
}

impl FieldsRequired {
    /// All four fields required.
    pub const ALL: FieldsRequired = FieldsRequired {
        has_binyan: true,
        has_guf: true,
    };

    /// Number of required fields: shoresh and zman always, plus binyan and guf when present.
    pub fn count(self) -> u32 {
        2 + u32::from(self.has_binyan) + u32::from(self.has_guf)
    }

    pub fn requires(self, field: Field) -> bool {
        match field {
            Field::Shoresh | Field::Zman => true,
            Field::Binyan => self.has_binyan,
            Field::Guf => self.has_guf,
        }
    }
}

/// A learner's free-text answers for one sentence. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFieldAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_shoresh: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_binyan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_zman: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_guf: String,
}

impl StudentFieldAnswer {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Shoresh => &self.student_shoresh,
            Field::Binyan => &self.student_binyan,
            Field::Zman => &self.student_zman,
            Field::Guf => &self.student_guf,
        }
    }
}

/// Per-sentence validation result.
///
/// `None` marks a field that is not required for the sentence; such fields
/// are excluded from scoring denominators rather than counted as wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCorrectness {
    pub shoresh_correct: bool,
    #[serde(default)]
    pub binyan_correct: Option<bool>,
    pub zman_correct: bool,
    #[serde(default)]
    pub guf_correct: Option<bool>,
}

impl FieldCorrectness {
    /// The flag for a field, `None` when it is not required.
    pub fn get(&self, field: Field) -> Option<bool> {
        match field {
            Field::Shoresh => Some(self.shoresh_correct),
            Field::Binyan => self.binyan_correct,
            Field::Zman => Some(self.zman_correct),
            Field::Guf => self.guf_correct,
        }
    }

    /// Requiredness implied by which flags are present.
    pub fn required(&self) -> FieldsRequired {
        FieldsRequired {
            has_binyan: self.binyan_correct.is_some(),
            has_guf: self.guf_correct.is_some(),
        }
    }

    /// Number of required fields.
    pub fn required_count(&self) -> u32 {
        self.required().count()
    }

    /// Number of required fields marked correct.
    pub fn correct_count(&self) -> u32 {
        Field::ALL
            .iter()
            .filter(|&&f| self.get(f) == Some(true))
            .count() as u32
    }

    pub fn all_correct(&self) -> bool {
        self.correct_count() == self.required_count()
    }

    /// Mark a field correct (teacher approval).
    ///
    /// Returns `false` and leaves the flags untouched when the field is not
    /// required for this sentence.
    pub fn approve(&mut self, field: Field) -> bool {
        match field {
            Field::Shoresh => self.shoresh_correct = true,
            Field::Zman => self.zman_correct = true,
            Field::Binyan => match self.binyan_correct.as_mut() {
                Some(flag) => *flag = true,
                None => return false,
            },
            Field::Guf => match self.guf_correct.as_mut() {
                Some(flag) => *flag = true,
                None => return false,
            },
        }
        true
    }
}

/// A sentence in an assignment: either a basic four-field analysis or a
/// structured advanced question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub assignment_id: String,
    pub sentence_number: u32,
    #[serde(default)]
    pub full_sentence: String,
    #[serde(default)]
    pub analyzed_word: String,
    #[serde(default)]
    pub answer_key: SentenceAnswerKey,
    /// Present when the sentence carries an advanced question instead of the basic form.
    #[serde(default)]
    pub question: Option<AdvancedQuestion>,
}

impl Sentence {
    pub fn is_advanced(&self) -> bool {
        self.question.is_some()
    }
}

/// A collection of sentences assigned together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl Assignment {
    pub fn sentence_by_number(&self, number: u32) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.sentence_number == number)
    }
}

/// A stored answer for one (submission, sentence) pair, together with the
/// grading results written back after submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentAnswer {
    pub sentence_id: String,
    /// Free-text answers for a basic sentence.
    #[serde(default)]
    pub fields: StudentFieldAnswer,
    /// Structured payload for an advanced question.
    #[serde(default)]
    pub answer_data: Option<AdvancedAnswer>,
    /// Written after grading a basic sentence.
    #[serde(default)]
    pub correctness: Option<FieldCorrectness>,
    /// Written after grading an advanced question.
    #[serde(default)]
    pub advanced_result: Option<AdvancedOutcome>,
}

impl StudentAnswer {
    pub fn basic(sentence_id: impl Into<String>, fields: StudentFieldAnswer) -> Self {
        Self {
            sentence_id: sentence_id.into(),
            fields,
            ..Default::default()
        }
    }

    pub fn advanced(sentence_id: impl Into<String>, answer_data: AdvancedAnswer) -> Self {
        Self {
            sentence_id: sentence_id.into(),
            answer_data: Some(answer_data),
            ..Default::default()
        }
    }
}
