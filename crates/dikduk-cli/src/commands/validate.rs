//! The `dikduk validate` command.

use std::path::PathBuf;

use anyhow::Result;

use dikduk_core::config::load_config_from;
use dikduk_core::parser;

pub fn execute(assignment_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let grammar = config.grammar()?;
    let assignments = parser::load_assignments(&assignment_path)?;

    let mut total_warnings = 0;

    for assignment in &assignments {
        let advanced = assignment.sentences.iter().filter(|s| s.is_advanced()).count();
        println!(
            "Assignment: {} ({} sentences, {} advanced)",
            assignment.title,
            assignment.sentences.len(),
            advanced
        );

        let warnings = parser::validate_assignment(assignment, &grammar);
        for w in &warnings {
            let prefix = w
                .sentence_number
                .map(|n| format!("  [#{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All assignments valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
