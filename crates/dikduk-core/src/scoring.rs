//! Sentence scoring and submission aggregation.
//!
//! A sentence is worth 10 points split evenly across its required fields.
//! A submission total is the proportion of correct required fields across
//! all sentences, scaled to 100.

use serde::{Deserialize, Serialize};

use crate::model::{Field, FieldCorrectness, FieldsRequired};

/// Maximum points for one sentence or advanced question.
pub const SENTENCE_POINTS: f64 = 10.0;

/// Score one sentence on a 0..=10 scale.
///
/// The denominator is 2 (shoresh, zman) plus one for each of binyan and guf
/// when required. Flags for non-required fields are ignored.
pub fn score_sentence(correctness: &FieldCorrectness, required: FieldsRequired) -> f64 {
    let denominator = required.count();
    let numerator = Field::ALL
        .iter()
        .filter(|&&f| required.requires(f) && correctness.get(f) == Some(true))
        .count();
    numerator as f64 * (SENTENCE_POINTS / denominator as f64)
}

/// Round half up to the nearest integer percentage.
pub fn round_percent(fraction: f64) -> u32 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Aggregate a submission: correct required fields over required fields, scaled to 100.
///
/// Requiredness comes from the flags themselves (`None` = not required), so
/// recomputing after a teacher approval always starts from the stored truth.
pub fn aggregate_submission(per_sentence: &[FieldCorrectness]) -> u32 {
    let mut tally = ScoreTally::default();
    for correctness in per_sentence {
        tally.add_fields(correctness);
    }
    tally.percent()
}

/// Running totals for a submission.
///
/// Basic sentences contribute one unit per required field. An advanced
/// question contributes one unit, earned in proportion to its 0..=10 score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreTally {
    pub earned: f64,
    pub possible: f64,
}

impl ScoreTally {
    pub fn add_fields(&mut self, correctness: &FieldCorrectness) {
        self.earned += f64::from(correctness.correct_count());
        self.possible += f64::from(correctness.required_count());
    }

    pub fn add_advanced(&mut self, score: f64) {
        self.earned += (score / SENTENCE_POINTS).clamp(0.0, 1.0);
        self.possible += 1.0;
    }

    /// Total on a 0..=100 scale. Nothing to grade scores 0.
    pub fn percent(&self) -> u32 {
        if self.possible <= 0.0 {
            return 0;
        }
        round_percent(self.earned / self.possible)
    }
}

/// How a submission total is derived from per-sentence results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Correct required fields over required fields, across the submission.
    #[default]
    Proportional,
    /// Mean of per-sentence point scores (2.5 or 10/3 per field), scaled to 100.
    FixedPoints,
}

impl ScoringPolicy {
    /// Compute a submission total from basic sentence flags and advanced question scores.
    pub fn total(self, basic: &[FieldCorrectness], advanced: &[f64]) -> u32 {
        match self {
            ScoringPolicy::Proportional => {
                let mut tally = ScoreTally::default();
                for correctness in basic {
                    tally.add_fields(correctness);
                }
                for &score in advanced {
                    tally.add_advanced(score);
                }
                tally.percent()
            }
            ScoringPolicy::FixedPoints => {
                let count = basic.len() + advanced.len();
                if count == 0 {
                    return 0;
                }
                let points: f64 = basic
                    .iter()
                    .map(|c| score_sentence(c, c.required()))
                    .chain(advanced.iter().map(|s| s.clamp(0.0, SENTENCE_POINTS)))
                    .sum();
                round_percent(points / (count as f64 * SENTENCE_POINTS))
            }
        }
    }
}

impl std::fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringPolicy::Proportional => write!(f, "proportional"),
            ScoringPolicy::FixedPoints => write!(f, "fixed_points"),
        }
    }
}

impl std::str::FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "proportional" => Ok(ScoringPolicy::Proportional),
            "fixed_points" | "fixed" => Ok(ScoringPolicy::FixedPoints),
            other => Err(format!("unknown scoring policy: {other}")),
        }
    }
}
