//! In-memory [`SubmissionStore`].
//!
//! State lives behind a tokio `RwLock` and can be exported as a
//! serializable [`StoreSnapshot`] for saving between CLI runs or for
//! inspecting in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::advanced::AdvancedOutcome;
use crate::error::StoreError;
use crate::model::{Assignment, FieldCorrectness, Sentence, StudentAnswer};
use crate::submission::Submission;
use crate::traits::SubmissionStore;

/// Everything a [`MemoryStore`] holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub assignments: BTreeMap<String, Assignment>,
    #[serde(default)]
    pub submissions: BTreeMap<String, Submission>,
    /// submission id → sentence id → answer
    #[serde(default)]
    pub answers: BTreeMap<String, BTreeMap<String, StudentAnswer>>,
}

impl StoreSnapshot {
    fn find_sentence(&self, sentence_id: &str) -> Option<&Sentence> {
        self.assignments
            .values()
            .flat_map(|a| a.sentences.iter())
            .find(|s| s.id == sentence_id)
    }

    fn answer_entry(&mut self, submission_id: &str, sentence_id: &str) -> &mut StudentAnswer {
        self.answers
            .entry(submission_id.to_string())
            .or_default()
            .entry(sentence_id.to_string())
            .or_insert_with(|| StudentAnswer {
                sentence_id: sentence_id.to_string(),
                ..Default::default()
            })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Builder-style helper for tests and one-shot CLI runs.
    pub fn with_assignment(assignment: Assignment) -> Self {
        let mut snapshot = StoreSnapshot::default();
        snapshot
            .assignments
            .insert(assignment.id.clone(), assignment);
        Self::from_snapshot(snapshot)
    }

    pub async fn insert_assignment(&self, assignment: Assignment) {
        self.state
            .write()
            .await
            .assignments
            .insert(assignment.id.clone(), assignment);
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn assignment(&self, assignment_id: &str) -> Result<Assignment, StoreError> {
        self.state
            .read()
            .await
            .assignments
            .get(assignment_id)
            .cloned()
            .ok_or_else(|| StoreError::AssignmentNotFound(assignment_id.to_string()))
    }

    async fn sentence(&self, sentence_id: &str) -> Result<Sentence, StoreError> {
        self.state
            .read()
            .await
            .find_sentence(sentence_id)
            .cloned()
            .ok_or_else(|| StoreError::SentenceNotFound(sentence_id.to_string()))
    }

    async fn submission(&self, submission_id: &str) -> Result<Submission, StoreError> {
        self.state
            .read()
            .await
            .submissions
            .get(submission_id)
            .cloned()
            .ok_or_else(|| StoreError::SubmissionNotFound(submission_id.to_string()))
    }

    async fn put_submission(&self, submission: Submission) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .submissions
            .insert(submission.id.clone(), submission);
        Ok(())
    }

    async fn delete_submission(&self, submission_id: &str) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .submissions
            .remove(submission_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::SubmissionNotFound(submission_id.to_string()))
    }

    async fn answer(
        &self,
        submission_id: &str,
        sentence_id: &str,
    ) -> Result<Option<StudentAnswer>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .answers
            .get(submission_id)
            .and_then(|by_sentence| by_sentence.get(sentence_id))
            .cloned())
    }

    async fn answers(&self, submission_id: &str) -> Result<Vec<StudentAnswer>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .answers
            .get(submission_id)
            .map(|by_sentence| by_sentence.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_answer(
        &self,
        submission_id: &str,
        answer: StudentAnswer,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let entry = state.answer_entry(submission_id, &answer.sentence_id);
        entry.fields = answer.fields;
        entry.answer_data = answer.answer_data;
        Ok(())
    }

    async fn write_correctness(
        &self,
        submission_id: &str,
        sentence_id: &str,
        correctness: FieldCorrectness,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.answer_entry(submission_id, sentence_id).correctness = Some(correctness);
        Ok(())
    }

    async fn write_advanced_result(
        &self,
        submission_id: &str,
        sentence_id: &str,
        outcome: AdvancedOutcome,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.answer_entry(submission_id, sentence_id).advanced_result = Some(outcome);
        Ok(())
    }

    async fn delete_answers(&self, submission_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .state
            .write()
            .await
            .answers
            .remove(submission_id)
            .map(|by_sentence| by_sentence.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SentenceAnswerKey, StudentFieldAnswer};

    fn assignment() -> Assignment {
        Assignment {
            id: "a1".into(),
            title: "Binyanim".into(),
            instructions: String::new(),
            sentences: vec![Sentence {
                id: "a1-1".into(),
                assignment_id: "a1".into(),
                sentence_number: 1,
                full_sentence: "הילד כתב מכתב".into(),
                analyzed_word: "כתב".into(),
                answer_key: SentenceAnswerKey {
                    correct_shoresh: "כתב".into(),
                    correct_binyan: Some("פעל".into()),
                    correct_zman: "עבר".into(),
                    correct_guf: Some("נסתר".into()),
                },
                question: None,
            }],
        }
    }

    #[tokio::test]
    async fn lookups() {
        let store = MemoryStore::with_assignment(assignment());
        assert_eq!(store.assignment("a1").await.unwrap().sentences.len(), 1);
        assert_eq!(store.sentence("a1-1").await.unwrap().sentence_number, 1);
        assert!(store.sentence("a1-9").await.unwrap_err().is_not_found());
        assert!(matches!(
            store.submission("nope").await,
            Err(StoreError::SubmissionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn correctness_write_creates_answer_row() {
        let store = MemoryStore::new();
        let flags = FieldCorrectness {
            shoresh_correct: true,
            binyan_correct: None,
            zman_correct: false,
            guf_correct: None,
        };
        store.write_correctness("s1", "a1-1", flags).await.unwrap();
        let stored = store.answer("s1", "a1-1").await.unwrap().unwrap();
        assert_eq!(stored.correctness, Some(flags));
        assert_eq!(stored.fields, StudentFieldAnswer::default());
    }

    #[tokio::test]
    async fn write_keeps_student_text() {
        let store = MemoryStore::new();
        let fields = StudentFieldAnswer {
            student_shoresh: "כתב".into(),
            ..Default::default()
        };
        store
            .save_answer("s1", StudentAnswer::basic("a1-1", fields.clone()))
            .await
            .unwrap();
        store
            .write_advanced_result("s1", "a1-1", AdvancedOutcome::new(true, 10.0))
            .await
            .unwrap();
        let stored = store.answer("s1", "a1-1").await.unwrap().unwrap();
        assert_eq!(stored.fields, fields);
        assert!(stored.advanced_result.is_some());
    }

    #[tokio::test]
    async fn resave_keeps_graded_flags() {
        let store = MemoryStore::new();
        let flags = FieldCorrectness {
            shoresh_correct: true,
            binyan_correct: Some(false),
            zman_correct: true,
            guf_correct: Some(false),
        };
        store.write_correctness("s1", "a1-1", flags).await.unwrap();
        let fields = StudentFieldAnswer {
            student_binyan: "פעל".into(),
            ..Default::default()
        };
        store
            .save_answer("s1", StudentAnswer::basic("a1-1", fields.clone()))
            .await
            .unwrap();
        let stored = store.answer("s1", "a1-1").await.unwrap().unwrap();
        assert_eq!(stored.fields, fields);
        assert_eq!(stored.correctness, Some(flags));
    }

    #[tokio::test]
    async fn delete_answers_counts_rows() {
        let store = MemoryStore::new();
        for id in ["a1-1", "a1-2"] {
            store
                .save_answer("s1", StudentAnswer::basic(id, StudentFieldAnswer::default()))
                .await
                .unwrap();
        }
        assert_eq!(store.delete_answers("s1").await.unwrap(), 2);
        assert_eq!(store.delete_answers("s1").await.unwrap(), 0);
        assert!(store.answers("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_roundtrip() {
        let store = MemoryStore::with_assignment(assignment());
        store
            .put_submission(Submission::new("s1", "a1", "dana"))
            .await
            .unwrap();
        let json = serde_json::to_string(&store.snapshot().await).unwrap();
        let restored = MemoryStore::from_snapshot(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.submission("s1").await.unwrap().student_id, "dana");
        assert_eq!(restored.sentence("a1-1").await.unwrap().analyzed_word, "כתב");
    }
}
