//! Aggregate statistics for a teacher's view of an assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Field, FieldCorrectness};
use crate::submission::{Submission, SubmissionStatus};

/// Submission counts and average score for one assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStats {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub submitted: usize,
    pub returned_for_revision: usize,
    /// Mean total of `submitted` submissions with a score, to one decimal place.
    pub average_score: Option<f64>,
}

impl AssignmentStats {
    pub fn count(&self, status: SubmissionStatus) -> usize {
        match status {
            SubmissionStatus::NotStarted => self.not_started,
            SubmissionStatus::InProgress => self.in_progress,
            SubmissionStatus::Submitted => self.submitted,
            SubmissionStatus::ReturnedForRevision => self.returned_for_revision,
        }
    }
}

/// Compute assignment statistics from its submissions.
pub fn compute_assignment_stats(submissions: &[Submission]) -> AssignmentStats {
    let mut stats = AssignmentStats {
        total: submissions.len(),
        ..Default::default()
    };
    let mut scores = Vec::new();

    for s in submissions {
        match s.status {
            SubmissionStatus::NotStarted => stats.not_started += 1,
            SubmissionStatus::InProgress => stats.in_progress += 1,
            SubmissionStatus::Submitted => {
                stats.submitted += 1;
                if let Some(score) = s.total_score {
                    scores.push(f64::from(score));
                }
            }
            SubmissionStatus::ReturnedForRevision => stats.returned_for_revision += 1,
        }
    }

    if !scores.is_empty() {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        stats.average_score = Some((mean * 10.0).round() / 10.0);
    }
    stats
}

/// How often one field was answered correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccuracy {
    pub correct: u32,
    /// Sentences where the field was required.
    pub graded: u32,
}

impl FieldAccuracy {
    /// Fraction correct; 0.0 when never graded.
    pub fn rate(&self) -> f64 {
        if self.graded == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.graded)
        }
    }
}

/// Per-field accuracy across graded sentences. Non-required fields are skipped.
pub fn field_accuracy<'a>(
    results: impl IntoIterator<Item = &'a FieldCorrectness>,
) -> BTreeMap<Field, FieldAccuracy> {
    let mut map: BTreeMap<Field, FieldAccuracy> = BTreeMap::new();
    for correctness in results {
        for field in Field::ALL {
            if let Some(flag) = correctness.get(field) {
                let entry = map.entry(field).or_default();
                entry.graded += 1;
                if flag {
                    entry.correct += 1;
                }
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(status: SubmissionStatus, score: Option<u32>) -> Submission {
        let mut s = Submission::new("s", "a", "student");
        s.status = status;
        s.total_score = score;
        s
    }

    #[test]
    fn counts_per_status() {
        let stats = compute_assignment_stats(&[
            submission(SubmissionStatus::NotStarted, None),
            submission(SubmissionStatus::InProgress, None),
            submission(SubmissionStatus::Submitted, Some(80)),
            submission(SubmissionStatus::ReturnedForRevision, Some(40)),
        ]);
        assert_eq!(stats.total, 4);
        for status in SubmissionStatus::ALL {
            assert_eq!(stats.count(status), 1, "{status}");
        }
    }

    #[test]
    fn average_only_over_submitted() {
        let stats = compute_assignment_stats(&[
            submission(SubmissionStatus::Submitted, Some(80)),
            submission(SubmissionStatus::Submitted, Some(71)),
            submission(SubmissionStatus::Submitted, Some(70)),
            submission(SubmissionStatus::ReturnedForRevision, Some(10)),
            submission(SubmissionStatus::Submitted, None),
        ]);
        // (80 + 71 + 70) / 3 = 73.666...
        assert_eq!(stats.average_score, Some(73.7));
    }

    #[test]
    fn no_scores_no_average() {
        let stats = compute_assignment_stats(&[submission(SubmissionStatus::InProgress, None)]);
        assert_eq!(stats.average_score, None);
        assert_eq!(compute_assignment_stats(&[]), AssignmentStats::default());
    }

    #[test]
    fn field_accuracy_skips_inapplicable() {
        let results = [
            FieldCorrectness {
                shoresh_correct: true,
                binyan_correct: Some(false),
                zman_correct: true,
                guf_correct: None,
            },
            FieldCorrectness {
                shoresh_correct: false,
                binyan_correct: Some(true),
                zman_correct: true,
                guf_correct: Some(true),
            },
        ];
        let acc = field_accuracy(&results);
        assert_eq!(acc[&Field::Shoresh], FieldAccuracy { correct: 1, graded: 2 });
        assert_eq!(acc[&Field::Zman].rate(), 1.0);
        assert_eq!(acc[&Field::Guf], FieldAccuracy { correct: 1, graded: 1 });
        assert_eq!(FieldAccuracy::default().rate(), 0.0);
    }
}
