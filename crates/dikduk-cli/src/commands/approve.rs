//! The `dikduk approve` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use dikduk_core::report::GradingReport;

use super::parse_field;

pub fn execute(report_path: PathBuf, sentence: u32, field: String) -> Result<()> {
    let field = parse_field(&field)?;
    let mut report = GradingReport::load_json(&report_path)?;

    let before = report.total_score;
    let total = report
        .approve(sentence, field)
        .with_context(|| format!("cannot approve {field} on sentence {sentence}"))?;
    report.save_json(&report_path)?;

    println!("Approved {field} for sentence {sentence}.");
    println!("Total: {before}/100 -> {total}/100");
    Ok(())
}
