//! Grading engine over a [`SubmissionStore`].
//!
//! Drives the submission lifecycle: saving answers, grading every sentence of
//! a submission with bounded concurrency, teacher approvals with full
//! recomputation, returning work for revision, and resetting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::advanced::{validate_advanced_question, AdvancedOutcome};
use crate::error::StoreError;
use crate::grammar::GrammarConfig;
use crate::model::{Field, Sentence, StudentAnswer, StudentFieldAnswer};
use crate::report::{
    submission_total, AssignmentSummary, GradingReport, SentenceOutcome, SentenceResult,
};
use crate::scoring::ScoringPolicy;
use crate::submission::Submission;
use crate::traits::SubmissionStore;
use crate::validate::FieldValidator;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum concurrent per-sentence store round trips.
    pub parallelism: usize,
    pub scoring_policy: ScoringPolicy,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            scoring_policy: ScoringPolicy::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_sentence_graded(&self, result: &SentenceResult);
    fn on_sentence_error(&self, sentence_id: &str, error: &str);
    fn on_submission_graded(&self, total: usize, graded: usize, score: u32, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_sentence_graded(&self, _: &SentenceResult) {}
    fn on_sentence_error(&self, _: &str, _: &str) {}
    fn on_submission_graded(&self, _: usize, _: usize, _: u32, _: Duration) {}
}

/// Grade one sentence against whatever the student stored for it.
///
/// A missing basic answer grades as all-blank. A missing or mis-shaped
/// advanced answer fails closed.
pub fn grade_sentence(
    validator: &FieldValidator<'_>,
    sentence: &Sentence,
    answer: Option<&StudentAnswer>,
) -> SentenceOutcome {
    match &sentence.question {
        Some(question) => {
            let result = match answer.and_then(|a| a.answer_data.as_ref()) {
                Some(data) => validate_advanced_question(validator, question, data),
                None => {
                    tracing::debug!("no answer for advanced sentence {}", sentence.id);
                    AdvancedOutcome::fail_closed()
                }
            };
            SentenceOutcome::Advanced {
                question_type: question.question_type().to_string(),
                result,
            }
        }
        None => {
            let fields = answer.map(|a| a.fields.clone()).unwrap_or_default();
            let correctness = validator.grade_basic(&sentence.answer_key, &fields);
            SentenceOutcome::Basic {
                answer: fields,
                correctness,
            }
        }
    }
}

/// The central grading engine.
pub struct GradingEngine {
    store: Arc<dyn SubmissionStore>,
    grammar: Arc<GrammarConfig>,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        grammar: Arc<GrammarConfig>,
        config: GradingEngineConfig,
    ) -> Self {
        Self {
            store,
            grammar,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    pub fn validator(&self) -> FieldValidator<'_> {
        FieldValidator::new(&self.grammar)
    }

    /// Create a fresh `not_started` submission for a known assignment.
    pub async fn start_submission(
        &self,
        submission_id: &str,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Submission, StoreError> {
        self.store.assignment(assignment_id).await?;
        let submission = Submission::new(submission_id, assignment_id, student_id);
        self.store.put_submission(submission.clone()).await?;
        Ok(submission)
    }

    /// Save one answer. The first save moves the submission to `in_progress`.
    pub async fn save_answer(
        &self,
        submission_id: &str,
        answer: StudentAnswer,
    ) -> Result<(), StoreError> {
        let mut submission = self.store.submission(submission_id).await?;
        let sentence = self.store.sentence(&answer.sentence_id).await?;
        if sentence.assignment_id != submission.assignment_id {
            return Err(StoreError::SentenceNotFound(answer.sentence_id));
        }
        let before = submission.status;
        submission.record_answer()?;
        self.store.save_answer(submission_id, answer).await?;
        if submission.status != before {
            self.store.put_submission(submission).await?;
        }
        Ok(())
    }

    /// Grade every sentence, write the flags back, and submit with the new total.
    pub async fn submit(
        &self,
        submission_id: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport, StoreError> {
        let start = Instant::now();
        let mut submission = self.store.submission(submission_id).await?;
        submission.ensure_can_submit()?;
        let assignment = self.store.assignment(&submission.assignment_id).await?;

        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let validator = self.validator();
        let mut futures = FuturesUnordered::new();

        for sentence in &assignment.sentences {
            let store = &self.store;
            let semaphore = &semaphore;

            futures.push(async move {
                let inner = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| StoreError::Backend("semaphore closed".into()))?;

                    let answer = store.answer(submission_id, &sentence.id).await?;
                    let outcome = grade_sentence(&validator, sentence, answer.as_ref());
                    match &outcome {
                        SentenceOutcome::Basic { correctness, .. } => {
                            store
                                .write_correctness(submission_id, &sentence.id, *correctness)
                                .await?
                        }
                        SentenceOutcome::Advanced { result, .. } => {
                            store
                                .write_advanced_result(submission_id, &sentence.id, result.clone())
                                .await?
                        }
                    }

                    Ok::<_, StoreError>(SentenceResult {
                        sentence_id: sentence.id.clone(),
                        sentence_number: sentence.sentence_number,
                        analyzed_word: sentence.analyzed_word.clone(),
                        outcome,
                    })
                };
                (sentence.id.as_str(), inner.await)
            });
        }

        let mut results = Vec::with_capacity(assignment.sentences.len());
        let mut first_error = None;

        while let Some((sentence_id, result)) = futures.next().await {
            match result {
                Ok(sentence_result) => {
                    progress.on_sentence_graded(&sentence_result);
                    results.push(sentence_result);
                }
                Err(e) => {
                    tracing::error!("grading failed for sentence {sentence_id}: {e}");
                    progress.on_sentence_error(sentence_id, &e.to_string());
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        results.sort_by_key(|r| r.sentence_number);
        let total_score =
            submission_total(self.config.scoring_policy, results.iter().map(|r| &r.outcome));

        submission.submit(total_score, Utc::now())?;
        self.store.put_submission(submission.clone()).await?;

        let elapsed = start.elapsed();
        progress.on_submission_graded(
            assignment.sentences.len(),
            results.len(),
            total_score,
            elapsed,
        );

        Ok(GradingReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            assignment: AssignmentSummary {
                id: assignment.id.clone(),
                title: assignment.title.clone(),
                sentence_count: assignment.sentences.len(),
            },
            submission_id: submission.id,
            student_id: submission.student_id,
            scoring_policy: self.config.scoring_policy,
            results,
            total_score,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Recompute a submission's total from every stored flag and persist it.
    ///
    /// Every sentence of the assignment counts. A sentence with no stored
    /// flags counts as unanswered.
    pub async fn recompute_total(&self, submission_id: &str) -> Result<u32, StoreError> {
        let mut submission = self.store.submission(submission_id).await?;
        let assignment = self.store.assignment(&submission.assignment_id).await?;
        let answers = self.store.answers(submission_id).await?;
        let validator = self.validator();

        let mut basic = Vec::new();
        let mut advanced = Vec::new();
        for sentence in &assignment.sentences {
            let answer = answers.iter().find(|a| a.sentence_id == sentence.id);
            if sentence.is_advanced() {
                advanced.push(
                    answer
                        .and_then(|a| a.advanced_result.as_ref())
                        .map_or(0.0, |r| r.score),
                );
            } else {
                basic.push(answer.and_then(|a| a.correctness).unwrap_or_else(|| {
                    validator.grade_basic(&sentence.answer_key, &StudentFieldAnswer::default())
                }));
            }
        }
        let total = self.config.scoring_policy.total(&basic, &advanced);

        submission.total_score = Some(total);
        self.store.put_submission(submission).await?;
        Ok(total)
    }

    /// Teacher approval of one field, followed by full recomputation.
    pub async fn approve_field(
        &self,
        submission_id: &str,
        sentence_id: &str,
        field: Field,
    ) -> Result<u32, StoreError> {
        let submission = self.store.submission(submission_id).await?;
        submission.ensure_graded()?;

        let answer = self
            .store
            .answer(submission_id, sentence_id)
            .await?
            .ok_or_else(|| StoreError::AnswerNotFound {
                submission_id: submission_id.to_string(),
                sentence_id: sentence_id.to_string(),
            })?;
        let not_applicable = || StoreError::FieldNotApplicable {
            sentence_id: sentence_id.to_string(),
            field,
        };
        let mut correctness = answer.correctness.ok_or_else(not_applicable)?;
        if !correctness.approve(field) {
            return Err(not_applicable());
        }
        self.store
            .write_correctness(submission_id, sentence_id, correctness)
            .await?;
        tracing::info!(submission = submission_id, sentence = sentence_id, %field, "field approved");

        self.recompute_total(submission_id).await
    }

    pub async fn return_for_revision(
        &self,
        submission_id: &str,
        feedback: Option<&str>,
    ) -> Result<Submission, StoreError> {
        let mut submission = self.store.submission(submission_id).await?;
        submission.return_for_revision(feedback, Utc::now())?;
        self.store.put_submission(submission.clone()).await?;
        Ok(submission)
    }

    /// Delete all answers and the submission itself. Returns the number of answers removed.
    pub async fn reset(&self, submission_id: &str) -> Result<usize, StoreError> {
        let submission = self.store.submission(submission_id).await?;
        submission.ensure_can_reset()?;
        let removed = self.store.delete_answers(submission_id).await?;
        self.store.delete_submission(submission_id).await?;
        tracing::info!(submission = submission_id, removed, "submission reset");
        Ok(removed)
    }
}
