//! Submission lifecycle and answer completeness.
//!
//! A submission moves `not_started → in_progress → submitted`, and a teacher
//! may send it back with `returned_for_revision`, after which the student
//! resubmits. Reset discards everything and is handled by the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Field, SentenceAnswerKey, StudentFieldAnswer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    NotStarted,
    InProgress,
    Submitted,
    ReturnedForRevision,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::NotStarted,
        SubmissionStatus::InProgress,
        SubmissionStatus::Submitted,
        SubmissionStatus::ReturnedForRevision,
    ];

    /// Whether the student may still change answers.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            SubmissionStatus::NotStarted
                | SubmissionStatus::InProgress
                | SubmissionStatus::ReturnedForRevision
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::NotStarted => write!(f, "not_started"),
            SubmissionStatus::InProgress => write!(f, "in_progress"),
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::ReturnedForRevision => write!(f, "returned_for_revision"),
        }
    }
}

/// One student's attempt at one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    /// 0..=100, set on submit and on every approval.
    #[serde(default)]
    pub total_score: Option<u32>,
    #[serde(default)]
    pub submission_count: u32,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teacher_feedback: Option<String>,
}

impl Submission {
    pub fn new(
        id: impl Into<String>,
        assignment_id: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            assignment_id: assignment_id.into(),
            student_id: student_id.into(),
            status: SubmissionStatus::NotStarted,
            total_score: None,
            submission_count: 0,
            submitted_at: None,
            last_submitted_at: None,
            reviewed_at: None,
            teacher_feedback: None,
        }
    }

    /// Record that an answer was saved. The first save starts the submission.
    pub fn record_answer(&mut self) -> Result<(), StoreError> {
        match self.status {
            SubmissionStatus::NotStarted => {
                self.status = SubmissionStatus::InProgress;
                Ok(())
            }
            SubmissionStatus::InProgress | SubmissionStatus::ReturnedForRevision => Ok(()),
            SubmissionStatus::Submitted => Err(self.invalid("edit")),
        }
    }

    /// Check that the submission may be submitted, without changing it.
    pub fn ensure_can_submit(&self) -> Result<(), StoreError> {
        match self.status {
            SubmissionStatus::InProgress | SubmissionStatus::ReturnedForRevision => Ok(()),
            _ => Err(self.invalid("submit")),
        }
    }

    /// Submit with a freshly computed total.
    pub fn submit(&mut self, total_score: u32, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.ensure_can_submit()?;
        self.status = SubmissionStatus::Submitted;
        self.total_score = Some(total_score);
        self.submission_count += 1;
        self.submitted_at = Some(now);
        self.last_submitted_at = Some(now);
        Ok(())
    }

    /// Teacher sends the submission back. Blank feedback is stored as none.
    pub fn return_for_revision(
        &mut self,
        feedback: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.status != SubmissionStatus::Submitted {
            return Err(self.invalid("return"));
        }
        self.status = SubmissionStatus::ReturnedForRevision;
        self.teacher_feedback = feedback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self.reviewed_at = Some(now);
        Ok(())
    }

    /// Reset is allowed from any status except `not_started`.
    pub fn ensure_can_reset(&self) -> Result<(), StoreError> {
        if self.status == SubmissionStatus::NotStarted {
            return Err(self.invalid("reset"));
        }
        Ok(())
    }

    /// Approvals only make sense on graded work.
    pub fn ensure_graded(&self) -> Result<(), StoreError> {
        match self.status {
            SubmissionStatus::Submitted | SubmissionStatus::ReturnedForRevision => Ok(()),
            _ => Err(self.invalid("approve fields on")),
        }
    }

    fn invalid(&self, action: &'static str) -> StoreError {
        StoreError::InvalidTransition {
            from: self.status,
            action,
        }
    }
}

/// How much of a basic sentence the student has filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerProgress {
    /// Every required field is non-blank.
    pub complete: bool,
    /// Some, but not all, required fields are non-blank.
    pub partial: bool,
    /// Blank required fields in shoresh, binyan, zman, guf order.
    pub missing_fields: Vec<Field>,
}

/// Completeness of one answer against the fields its key requires.
pub fn answer_progress(key: &SentenceAnswerKey, answer: &StudentFieldAnswer) -> AnswerProgress {
    let required = key.required();
    let (mut filled, mut missing_fields) = (0usize, Vec::new());
    for field in Field::ALL.into_iter().filter(|&f| required.requires(f)) {
        if answer.get(field).trim().is_empty() {
            missing_fields.push(field);
        } else {
            filled += 1;
        }
    }
    AnswerProgress {
        complete: missing_fields.is_empty(),
        partial: filled > 0 && !missing_fields.is_empty(),
        missing_fields,
    }
}

/// Counts across a whole submission, as shown before submitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub complete: usize,
    pub partial: usize,
    pub empty: usize,
}

impl ProgressSummary {
    pub fn add(&mut self, progress: &AnswerProgress) {
        if progress.complete {
            self.complete += 1;
        } else if progress.partial {
            self.partial += 1;
        } else {
            self.empty += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.complete + self.partial + self.empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn submitted() -> Submission {
        let mut s = Submission::new("sub-1", "a", "student");
        s.record_answer().unwrap();
        s.submit(80, ts()).unwrap();
        s
    }

    #[test]
    fn first_answer_starts_submission() {
        let mut s = Submission::new("sub-1", "a", "student");
        assert_eq!(s.status, SubmissionStatus::NotStarted);
        s.record_answer().unwrap();
        assert_eq!(s.status, SubmissionStatus::InProgress);
        s.record_answer().unwrap();
        assert_eq!(s.status, SubmissionStatus::InProgress);
    }

    #[test]
    fn cannot_submit_before_starting() {
        let mut s = Submission::new("sub-1", "a", "student");
        let err = s.submit(50, ts()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(s.submission_count, 0);
    }

    #[test]
    fn submit_sets_score_and_timestamps() {
        let s = submitted();
        assert_eq!(s.status, SubmissionStatus::Submitted);
        assert_eq!(s.total_score, Some(80));
        assert_eq!(s.submission_count, 1);
        assert_eq!(s.submitted_at, Some(ts()));
        assert_eq!(s.last_submitted_at, Some(ts()));
    }

    #[test]
    fn submitted_work_is_locked() {
        let mut s = submitted();
        assert!(s.record_answer().is_err());
        assert!(s.submit(90, ts()).is_err());
        assert!(!s.status.is_editable());
    }

    #[test]
    fn return_and_resubmit() {
        let mut s = submitted();
        s.return_for_revision(Some("  check the binyan  "), ts()).unwrap();
        assert_eq!(s.status, SubmissionStatus::ReturnedForRevision);
        assert_eq!(s.teacher_feedback.as_deref(), Some("check the binyan"));
        assert_eq!(s.reviewed_at, Some(ts()));

        s.record_answer().unwrap();
        assert_eq!(s.status, SubmissionStatus::ReturnedForRevision);
        s.submit(95, ts()).unwrap();
        assert_eq!(s.submission_count, 2);
        assert_eq!(s.total_score, Some(95));
    }

    #[test]
    fn blank_feedback_is_none() {
        let mut s = submitted();
        s.return_for_revision(Some("   "), ts()).unwrap();
        assert_eq!(s.teacher_feedback, None);
    }

    #[test]
    fn return_requires_submitted() {
        let mut s = Submission::new("sub-1", "a", "student");
        s.record_answer().unwrap();
        assert!(s.return_for_revision(None, ts()).is_err());
    }

    #[test]
    fn reset_rules() {
        assert!(Submission::new("s", "a", "x").ensure_can_reset().is_err());
        assert!(submitted().ensure_can_reset().is_ok());
    }

    #[test]
    fn status_serde() {
        let json = serde_json::to_string(&SubmissionStatus::ReturnedForRevision).unwrap();
        assert_eq!(json, "\"returned_for_revision\"");
        let s: SubmissionStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(s, SubmissionStatus::InProgress);
    }

    fn key(binyan: Option<&str>, guf: Option<&str>) -> SentenceAnswerKey {
        SentenceAnswerKey {
            correct_shoresh: "כתב".into(),
            correct_binyan: binyan.map(Into::into),
            correct_zman: "עבר".into(),
            correct_guf: guf.map(Into::into),
        }
    }

    #[test]
    fn progress_lists_missing_in_field_order() {
        let answer = StudentFieldAnswer {
            student_shoresh: "כתב".into(),
            ..Default::default()
        };
        let p = answer_progress(&key(Some("פעל"), Some("נסתר")), &answer);
        assert!(!p.complete);
        assert!(p.partial);
        assert_eq!(p.missing_fields, vec![Field::Binyan, Field::Zman, Field::Guf]);
    }

    #[test]
    fn progress_ignores_fields_not_required() {
        let answer = StudentFieldAnswer {
            student_shoresh: "כתב".into(),
            student_zman: "שם פועל".into(),
            ..Default::default()
        };
        let p = answer_progress(&key(None, None), &answer);
        assert!(p.complete);
        assert!(!p.partial);
        assert!(p.missing_fields.is_empty());
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let answer = StudentFieldAnswer {
            student_shoresh: "  ".into(),
            ..Default::default()
        };
        let p = answer_progress(&key(None, None), &answer);
        assert!(!p.partial);
        assert_eq!(p.missing_fields, vec![Field::Shoresh, Field::Zman]);

        let mut summary = ProgressSummary::default();
        summary.add(&p);
        summary.add(&answer_progress(
            &key(None, None),
            &StudentFieldAnswer {
                student_shoresh: "כתב".into(),
                student_zman: "עבר".into(),
                ..Default::default()
            },
        ));
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.complete, 1);
        assert_eq!(summary.total(), 2);
    }
}
