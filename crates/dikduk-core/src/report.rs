//! Grading report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advanced::AdvancedOutcome;
use crate::error::StoreError;
use crate::model::{Field, FieldCorrectness, StudentFieldAnswer};
use crate::scoring::{score_sentence, ScoringPolicy};

/// How one sentence was graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SentenceOutcome {
    Basic {
        answer: StudentFieldAnswer,
        correctness: FieldCorrectness,
    },
    Advanced {
        question_type: String,
        result: AdvancedOutcome,
    },
}

impl SentenceOutcome {
    /// Points on the 0..=10 sentence scale.
    pub fn points(&self) -> f64 {
        match self {
            SentenceOutcome::Basic { correctness, .. } => {
                score_sentence(correctness, correctness.required())
            }
            SentenceOutcome::Advanced { result, .. } => result.score,
        }
    }

    pub fn is_correct(&self) -> bool {
        match self {
            SentenceOutcome::Basic { correctness, .. } => correctness.all_correct(),
            SentenceOutcome::Advanced { result, .. } => result.correct,
        }
    }
}

/// Result for one sentence of the assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceResult {
    pub sentence_id: String,
    pub sentence_number: u32,
    #[serde(default)]
    pub analyzed_word: String,
    pub outcome: SentenceOutcome,
}

/// Submission total under `policy` from a set of sentence outcomes.
pub fn submission_total<'a>(
    policy: ScoringPolicy,
    outcomes: impl IntoIterator<Item = &'a SentenceOutcome>,
) -> u32 {
    let mut basic = Vec::new();
    let mut advanced = Vec::new();
    for outcome in outcomes {
        match outcome {
            SentenceOutcome::Basic { correctness, .. } => basic.push(*correctness),
            SentenceOutcome::Advanced { result, .. } => advanced.push(result.score),
        }
    }
    policy.total(&basic, &advanced)
}

/// Summary of the graded assignment (without its answer keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub id: String,
    pub title: String,
    pub sentence_count: usize,
}

/// A graded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub assignment: AssignmentSummary,
    pub submission_id: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub scoring_policy: ScoringPolicy,
    /// Ordered by sentence number.
    pub results: Vec<SentenceResult>,
    /// 0..=100
    pub total_score: u32,
    /// Wall-clock grading time in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Recompute the total from every sentence's current flags.
    pub fn recompute_total(&mut self) -> u32 {
        self.total_score =
            submission_total(self.scoring_policy, self.results.iter().map(|r| &r.outcome));
        self.total_score
    }

    /// Teacher approval: mark one field of one sentence correct and recompute.
    pub fn approve(&mut self, sentence_number: u32, field: Field) -> Result<u32, StoreError> {
        let result = self
            .results
            .iter_mut()
            .find(|r| r.sentence_number == sentence_number)
            .ok_or_else(|| StoreError::SentenceNotFound(sentence_number.to_string()))?;

        let applied = match &mut result.outcome {
            SentenceOutcome::Basic { correctness, .. } => correctness.approve(field),
            SentenceOutcome::Advanced { .. } => false,
        };
        if !applied {
            return Err(StoreError::FieldNotApplicable {
                sentence_id: result.sentence_id.clone(),
                field,
            });
        }
        tracing::info!(sentence = sentence_number, %field, "field approved");
        Ok(self.recompute_total())
    }

    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_correct()).count()
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.assignment.title));
        md.push_str(&format!(
            "**Submission:** {} ({})  \n**Total:** {}/100 ({})  \n**Fully correct:** {}/{}\n\n",
            self.submission_id,
            self.student_id,
            self.total_score,
            self.scoring_policy,
            self.correct_count(),
            self.results.len()
        ));

        let basic: Vec<_> = self
            .results
            .iter()
            .filter_map(|r| match &r.outcome {
                SentenceOutcome::Basic { correctness, .. } => Some((r, correctness)),
                SentenceOutcome::Advanced { .. } => None,
            })
            .collect();
        if !basic.is_empty() {
            md.push_str("| # | Word | ");
            for field in Field::ALL {
                md.push_str(&format!("{} | ", field.display_name()));
            }
            md.push_str("Points |\n");
            md.push_str("|---|------|------|-------|-----|-----|--------|\n");
            for (r, correctness) in basic {
                md.push_str(&format!("| {} | {} | ", r.sentence_number, r.analyzed_word));
                for field in Field::ALL {
                    md.push_str(mark(correctness.get(field)));
                    md.push_str(" | ");
                }
                md.push_str(&format!("{:.1} |\n", r.outcome.points()));
            }
            md.push('\n');
        }

        let advanced: Vec<_> = self
            .results
            .iter()
            .filter_map(|r| match &r.outcome {
                SentenceOutcome::Advanced {
                    question_type,
                    result,
                } => Some((r, question_type, result)),
                SentenceOutcome::Basic { .. } => None,
            })
            .collect();
        if !advanced.is_empty() {
            md.push_str("### Advanced questions\n\n");
            md.push_str("| # | Type | Correct | Points | Parts |\n");
            md.push_str("|---|------|---------|--------|-------|\n");
            for (r, question_type, result) in advanced {
                let parts = result
                    .partial_scores
                    .iter()
                    .map(|(name, score)| format!("{name} {score:.1}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                md.push_str(&format!(
                    "| {} | {} | {} | {:.1} | {} |\n",
                    r.sentence_number,
                    question_type,
                    mark(Some(result.correct)),
                    result.score,
                    parts
                ));
            }
        }

        md
    }
}

fn mark(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "✓",
        Some(false) => "✗",
        None => "-",
    }
}
