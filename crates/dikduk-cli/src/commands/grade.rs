//! The `dikduk grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use dikduk_core::config::load_config_from;
use dikduk_core::engine::{GradingEngine, ProgressReporter};
use dikduk_core::model::{Assignment, StudentAnswer};
use dikduk_core::parser;
use dikduk_core::report::{GradingReport, SentenceOutcome, SentenceResult};
use dikduk_core::store::MemoryStore;
use dikduk_core::submission::{answer_progress, ProgressSummary};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_sentence_graded(&self, result: &SentenceResult) {
        let status = if result.outcome.is_correct() {
            "OK"
        } else {
            "MISS"
        };
        eprintln!(
            "  Graded: #{} {} [{}] {:.1}/10",
            result.sentence_number,
            result.analyzed_word,
            status,
            result.outcome.points()
        );
    }

    fn on_sentence_error(&self, sentence_id: &str, error: &str) {
        eprintln!("  ERROR: {sentence_id}: {error}");
    }

    fn on_submission_graded(&self, total: usize, graded: usize, score: u32, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} sentences graded, total {score}/100 ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    assignment_path: PathBuf,
    answers_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json" | "markdown"),
        "unknown format '{format}' (expected text, json or markdown)"
    );

    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(?config, "loaded config");
    let grammar = config.grammar()?;

    let assignment = parser::parse_assignment(&assignment_path)?;
    let sheet = parser::parse_answer_sheet(&answers_path)?;
    if let Some(id) = &sheet.assignment_id {
        anyhow::ensure!(
            id == &assignment.id,
            "answer sheet is for assignment '{id}', not '{}'",
            assignment.id
        );
    }

    let answers = sheet.to_student_answers(&assignment);
    anyhow::ensure!(
        !answers.is_empty(),
        "answer sheet has no answers for assignment '{}'",
        assignment.id
    );
    print_progress(&assignment, &answers);

    let submission_id = sheet
        .submission_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let student_id = if sheet.student_id.is_empty() {
        "anonymous".to_string()
    } else {
        sheet.student_id.clone()
    };

    let store = Arc::new(MemoryStore::with_assignment(assignment.clone()));
    let engine = GradingEngine::new(store, Arc::new(grammar), config.engine_config());

    eprintln!(
        "dikduk v{}: grading {} ({} sentences) for {student_id}",
        env!("CARGO_PKG_VERSION"),
        assignment.title,
        assignment.sentences.len()
    );
    eprintln!();

    engine
        .start_submission(&submission_id, &assignment.id, &student_id)
        .await?;
    for answer in answers {
        engine.save_answer(&submission_id, answer).await?;
    }
    let report = engine.submit(&submission_id, &ConsoleReporter).await?;

    let output = output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = output.join(format!("{submission_id}-{timestamp}.json"));
    report.save_json(&path)?;
    eprintln!("Report saved to: {}", path.display());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" => print!("{}", report.to_markdown()),
        _ => print_summary(&report),
    }

    Ok(())
}

/// Completion overview of the sheet before grading.
fn print_progress(assignment: &Assignment, answers: &[StudentAnswer]) {
    let mut summary = ProgressSummary::default();
    for sentence in assignment.sentences.iter().filter(|s| !s.is_advanced()) {
        let fields = answers
            .iter()
            .find(|a| a.sentence_id == sentence.id)
            .map(|a| a.fields.clone())
            .unwrap_or_default();
        let progress = answer_progress(&sentence.answer_key, &fields);
        if !progress.missing_fields.is_empty() {
            let missing: Vec<String> = progress
                .missing_fields
                .iter()
                .map(|f| f.to_string())
                .collect();
            eprintln!(
                "  Sentence {} is missing: {}",
                sentence.sentence_number,
                missing.join(", ")
            );
        }
        summary.add(&progress);
    }
    if summary.total() > 0 {
        eprintln!(
            "Answers: {} complete, {} partial, {} empty",
            summary.complete, summary.partial, summary.empty
        );
    }
}

fn print_summary(report: &GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Word", "Type", "Result", "Points"]);

    for r in &report.results {
        let (kind, detail) = match &r.outcome {
            SentenceOutcome::Basic { correctness, .. } => (
                "basic".to_string(),
                format!("{}/{} fields", correctness.correct_count(), correctness.required_count()),
            ),
            SentenceOutcome::Advanced {
                question_type,
                result,
            } => (
                question_type.clone(),
                if result.correct { "correct" } else { "incorrect" }.to_string(),
            ),
        };
        table.add_row(vec![
            Cell::new(r.sentence_number),
            Cell::new(&r.analyzed_word),
            Cell::new(kind),
            Cell::new(detail),
            Cell::new(format!("{:.1}", r.outcome.points())),
        ]);
    }

    println!("{table}");
    println!(
        "Total: {}/100 ({}), {}/{} sentences fully correct",
        report.total_score,
        report.scoring_policy,
        report.correct_count(),
        report.results.len()
    );
}
