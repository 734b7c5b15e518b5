//! The persistence contract the grading engine depends on.
//!
//! The engine never talks to a database directly. Anything that can hand out
//! answer keys and student answers, and accept correctness flags and totals
//! back, can sit behind [`SubmissionStore`]. [`MemoryStore`](crate::store::MemoryStore)
//! is the in-process implementation.

use async_trait::async_trait;

use crate::advanced::AdvancedOutcome;
use crate::error::StoreError;
use crate::model::{Assignment, FieldCorrectness, Sentence, StudentAnswer};
use crate::submission::Submission;

/// Storage for assignments, submissions and per-sentence answers.
///
/// Writes are last-write-wins.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// An assignment with all of its sentences.
    async fn assignment(&self, assignment_id: &str) -> Result<Assignment, StoreError>;

    /// One sentence by id.
    async fn sentence(&self, sentence_id: &str) -> Result<Sentence, StoreError>;

    async fn submission(&self, submission_id: &str) -> Result<Submission, StoreError>;

    /// Insert or replace a submission.
    async fn put_submission(&self, submission: Submission) -> Result<(), StoreError>;

    async fn delete_submission(&self, submission_id: &str) -> Result<(), StoreError>;

    /// The student's stored answer for a sentence, if any.
    async fn answer(
        &self,
        submission_id: &str,
        sentence_id: &str,
    ) -> Result<Option<StudentAnswer>, StoreError>;

    /// All stored answers for a submission.
    async fn answers(&self, submission_id: &str) -> Result<Vec<StudentAnswer>, StoreError>;

    /// Insert or replace the student's text for `answer.sentence_id`.
    /// Flags already graded for that sentence are kept.
    async fn save_answer(&self, submission_id: &str, answer: StudentAnswer)
        -> Result<(), StoreError>;

    /// Write per-field flags for a basic sentence, creating an empty answer if none exists.
    async fn write_correctness(
        &self,
        submission_id: &str,
        sentence_id: &str,
        correctness: FieldCorrectness,
    ) -> Result<(), StoreError>;

    /// Write the result of an advanced question, creating an empty answer if none exists.
    async fn write_advanced_result(
        &self,
        submission_id: &str,
        sentence_id: &str,
        outcome: AdvancedOutcome,
    ) -> Result<(), StoreError>;

    /// Delete all answers for a submission, returning how many were removed.
    async fn delete_answers(&self, submission_id: &str) -> Result<usize, StoreError>;
}
