//! Store and lifecycle error types.
//!
//! The scoring engine itself never fails. These errors come from the
//! collaborator surfaces around it: looking up records, moving a submission
//! through its lifecycle, and approving fields. Callers that work in
//! `anyhow` can downcast to classify them.

use thiserror::Error;

use crate::model::Field;
use crate::submission::SubmissionStatus;

/// Errors raised by a [`SubmissionStore`](crate::traits::SubmissionStore) or
/// by the grading engine when acting on stored records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),

    #[error("sentence not found: {0}")]
    SentenceNotFound(String),

    /// No graded answer exists for the sentence in this submission.
    #[error("no graded answer for sentence {sentence_id} in submission {submission_id}")]
    AnswerNotFound {
        submission_id: String,
        sentence_id: String,
    },

    /// The requested action is not allowed from the current status.
    #[error("cannot {action} a submission that is {from}")]
    InvalidTransition {
        from: SubmissionStatus,
        action: &'static str,
    },

    /// The field is not graded for this sentence (e.g. guf on an infinitive),
    /// or the sentence is an advanced question with no per-field flags.
    #[error("field {field} is not graded for sentence {sentence_id}")]
    FieldNotApplicable { sentence_id: String, field: Field },

    /// The backing store failed.
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the lookup failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::SubmissionNotFound(_)
                | StoreError::AssignmentNotFound(_)
                | StoreError::SentenceNotFound(_)
                | StoreError::AnswerNotFound { .. }
        )
    }
}
