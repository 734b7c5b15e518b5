//! Assignment TOML parser and answer-sheet loader.
//!
//! Loads assignments from TOML files and directories, validates them against
//! a grammar table, and reads student answer sheets from JSON.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::advanced::{AdvancedAnswer, AdvancedQuestion};
use crate::grammar::{GrammarConfig, GrammarField};
use crate::model::{null_as_default, present, Assignment, Sentence, SentenceAnswerKey, StudentAnswer, StudentFieldAnswer};
use crate::normalize::normalize;

/// Intermediate TOML structure for parsing assignment files.
#[derive(Debug, Deserialize)]
struct TomlAssignmentFile {
    assignment: TomlAssignmentHeader,
    #[serde(default)]
    sentences: Vec<TomlSentence>,
}

#[derive(Debug, Deserialize)]
struct TomlAssignmentHeader {
    id: String,
    title: String,
    #[serde(default)]
    instructions: String,
}

#[derive(Debug, Deserialize)]
struct TomlSentence {
    sentence_number: u32,
    #[serde(default)]
    full_sentence: String,
    #[serde(default)]
    analyzed_word: String,
    #[serde(default)]
    correct_shoresh: String,
    #[serde(default)]
    correct_binyan: Option<String>,
    #[serde(default)]
    correct_zman: String,
    #[serde(default)]
    correct_guf: Option<String>,
    #[serde(default)]
    question: Option<AdvancedQuestion>,
}

/// Parse a single TOML file into an `Assignment`.
pub fn parse_assignment(path: &Path) -> Result<Assignment> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assignment file: {}", path.display()))?;

    parse_assignment_str(&content, path)
}

/// Parse a TOML string into an `Assignment` (useful for testing).
pub fn parse_assignment_str(content: &str, source_path: &Path) -> Result<Assignment> {
    let parsed: TomlAssignmentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let assignment_id = parsed.assignment.id;
    let sentences = parsed
        .sentences
        .into_iter()
        .map(|s| Sentence {
            id: format!("{}-{}", assignment_id, s.sentence_number),
            assignment_id: assignment_id.clone(),
            sentence_number: s.sentence_number,
            full_sentence: s.full_sentence,
            analyzed_word: s.analyzed_word,
            answer_key: SentenceAnswerKey {
                correct_shoresh: s.correct_shoresh,
                correct_binyan: s.correct_binyan,
                correct_zman: s.correct_zman,
                correct_guf: s.correct_guf,
            },
            question: s.question,
        })
        .collect();

    Ok(Assignment {
        id: assignment_id,
        title: parsed.assignment.title,
        instructions: parsed.assignment.instructions,
        sentences,
    })
}

/// Recursively load all `.toml` assignment files from a directory.
pub fn load_assignment_directory(dir: &Path) -> Result<Vec<Assignment>> {
    let mut assignments = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            assignments.extend(load_assignment_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_assignment(&path) {
                Ok(assignment) => assignments.push(assignment),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    assignments.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(assignments)
}

/// Load one file, or every assignment under a directory.
pub fn load_assignments(path: &Path) -> Result<Vec<Assignment>> {
    if path.is_dir() {
        load_assignment_directory(path)
    } else {
        Ok(vec![parse_assignment(path)?])
    }
}

/// A warning from assignment validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The sentence number (if applicable).
    pub sentence_number: Option<u32>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn sentence(number: u32, message: impl Into<String>) -> Self {
        Self {
            sentence_number: Some(number),
            message: message.into(),
        }
    }
}

/// Validate an assignment's answer keys against a grammar table.
pub fn validate_assignment(assignment: &Assignment, grammar: &GrammarConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if assignment.sentences.is_empty() {
        warnings.push(ValidationWarning {
            sentence_number: None,
            message: "assignment has no sentences".into(),
        });
    }

    let mut seen = HashSet::new();
    for sentence in &assignment.sentences {
        if !seen.insert(sentence.sentence_number) {
            warnings.push(ValidationWarning::sentence(
                sentence.sentence_number,
                format!("duplicate sentence number: {}", sentence.sentence_number),
            ));
        }
    }

    let infinitive = normalize("שם פועל");
    for sentence in &assignment.sentences {
        let n = sentence.sentence_number;

        if let Some(question) = &sentence.question {
            if matches!(question, AdvancedQuestion::Unsupported) {
                warnings.push(ValidationWarning::sentence(
                    n,
                    "unsupported question type, answers will score 0",
                ));
            } else if question.has_empty_key() {
                warnings.push(ValidationWarning::sentence(
                    n,
                    format!("{} question has an empty correct answer", question.question_type()),
                ));
            }
            continue;
        }

        let key = &sentence.answer_key;
        if key.correct_shoresh.trim().is_empty() {
            warnings.push(ValidationWarning::sentence(n, "correct_shoresh is empty"));
        }
        if key.correct_zman.trim().is_empty() {
            warnings.push(ValidationWarning::sentence(n, "correct_zman is empty"));
        } else if !grammar.is_known(GrammarField::Zman, &key.correct_zman) {
            warnings.push(ValidationWarning::sentence(
                n,
                format!("zman '{}' is not in the grammar table", key.correct_zman),
            ));
        }

        let checks = [
            (GrammarField::Binyan, "binyan", present(key.correct_binyan.as_deref())),
            (GrammarField::Guf, "guf", present(key.correct_guf.as_deref())),
        ];
        for (field, name, value) in checks {
            if let Some(value) = value {
                if !grammar.is_known(field, value) {
                    warnings.push(ValidationWarning::sentence(
                        n,
                        format!("{name} '{value}' is not in the grammar table"),
                    ));
                }
            }
        }

        if normalize(&key.correct_zman) == infinitive && key.required().has_guf {
            warnings.push(ValidationWarning::sentence(
                n,
                "guf given for an infinitive (שם פועל); it will be required",
            ));
        }
    }

    warnings
}

/// A student's answers to one assignment, as exchanged in JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub assignment_id: Option<String>,
    #[serde(default)]
    pub submission_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub student_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<SheetAnswer>,
}

/// One answer keyed by sentence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetAnswer {
    pub sentence_number: u32,
    #[serde(flatten)]
    pub fields: StudentFieldAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_data: Option<AdvancedAnswer>,
}

impl AnswerSheet {
    /// Map sentence numbers to sentence ids. Answers to unknown sentences are skipped.
    pub fn to_student_answers(&self, assignment: &Assignment) -> Vec<StudentAnswer> {
        self.answers
            .iter()
            .filter_map(|a| {
                let Some(sentence) = assignment.sentence_by_number(a.sentence_number) else {
                    tracing::warn!(
                        "answer for unknown sentence {} in assignment {}, skipping",
                        a.sentence_number,
                        assignment.id
                    );
                    return None;
                };
                Some(StudentAnswer {
                    sentence_id: sentence.id.clone(),
                    fields: a.fields.clone(),
                    answer_data: a.answer_data.clone(),
                    ..Default::default()
                })
            })
            .collect()
    }
}

/// Parse an answer sheet from a JSON file.
pub fn parse_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet JSON: {}", path.display()))
}
