//! Field validators for the basic four-field analysis.
//!
//! Each validator is a pure predicate over (student answer, correct answer).
//! An empty student answer is not special-cased: it simply fails to match.

use crate::grammar::{GrammarConfig, GrammarField};
use crate::model::{present, Field, FieldCorrectness, SentenceAnswerKey, StudentFieldAnswer};
use crate::normalize::normalize;

/// Validates answers against an injected grammar table.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'g> {
    grammar: &'g GrammarConfig,
}

impl<'g> FieldValidator<'g> {
    pub fn new(grammar: &'g GrammarConfig) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'g GrammarConfig {
        self.grammar
    }

    /// Roots have no variant table; dotted, dashed and final-letter spellings
    /// are absorbed by normalization.
    pub fn validate_shoresh(&self, answer: &str, correct: &str) -> bool {
        normalize(answer) == normalize(correct)
    }

    pub fn validate_binyan(&self, answer: &str, correct: &str) -> bool {
        self.matches_variant(GrammarField::Binyan, answer, correct)
    }

    pub fn validate_zman(&self, answer: &str, correct: &str) -> bool {
        self.matches_variant(GrammarField::Zman, answer, correct)
    }

    /// Always true when there is no correct guf (e.g. infinitives).
    pub fn validate_guf(&self, answer: &str, correct: Option<&str>) -> bool {
        match present(correct) {
            Some(correct) => self.matches_variant(GrammarField::Guf, answer, correct),
            None => true,
        }
    }

    /// Validate one field by name.
    pub fn validate(&self, field: Field, answer: &str, correct: Option<&str>) -> bool {
        match field {
            Field::Shoresh => self.validate_shoresh(answer, correct.unwrap_or_default()),
            Field::Binyan => self.validate_binyan(answer, correct.unwrap_or_default()),
            Field::Zman => self.validate_zman(answer, correct.unwrap_or_default()),
            Field::Guf => self.validate_guf(answer, correct),
        }
    }

    /// Grade a basic sentence. Fields the key does not require come back as `None`.
    pub fn grade_basic(
        &self,
        key: &SentenceAnswerKey,
        answer: &StudentFieldAnswer,
    ) -> FieldCorrectness {
        let required = key.required();
        FieldCorrectness {
            shoresh_correct: self.validate_shoresh(&answer.student_shoresh, &key.correct_shoresh),
            binyan_correct: required.has_binyan.then(|| {
                self.validate_binyan(
                    &answer.student_binyan,
                    key.correct(Field::Binyan).unwrap_or_default(),
                )
            }),
            zman_correct: self.validate_zman(&answer.student_zman, &key.correct_zman),
            guf_correct: required
                .has_guf
                .then(|| self.validate_guf(&answer.student_guf, key.correct(Field::Guf))),
        }
    }

    fn matches_variant(&self, field: GrammarField, answer: &str, correct: &str) -> bool {
        let answer = normalize(answer);
        self.grammar
            .accepted_variants(field, correct)
            .into_iter()
            .any(|variant| normalize(variant) == answer)
    }
}
