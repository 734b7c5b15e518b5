//! The `dikduk check` command.

use std::path::PathBuf;

use anyhow::Result;

use dikduk_core::config::load_config_from;
use dikduk_core::grammar::GrammarField;
use dikduk_core::normalize::normalize;
use dikduk_core::validate::FieldValidator;

use super::parse_field;

pub fn execute(
    field: String,
    answer: String,
    expected: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let field = parse_field(&field)?;
    let config = load_config_from(config_path.as_deref())?;
    let grammar = config.grammar()?;
    let validator = FieldValidator::new(&grammar);

    println!("Normalized: {}", normalize(&answer));

    match expected {
        Some(expected) => {
            if validator.validate(field, &answer, Some(expected.as_str())) {
                println!("Correct: '{answer}' is accepted for {field} '{expected}'");
            } else {
                println!("Incorrect: '{answer}' is not accepted for {field} '{expected}'");
            }
        }
        None => match GrammarField::for_field(field) {
            Some(grammar_field) => {
                let matches: Vec<&str> = grammar
                    .options(grammar_field)
                    .iter()
                    .filter(|opt| opt.accepts(&answer))
                    .map(|opt| opt.value.as_str())
                    .collect();
                if matches.is_empty() {
                    println!("No {field} value accepts '{answer}'");
                } else {
                    println!("Accepted as {field}: {}", matches.join(", "));
                }
            }
            None => println!("{field} is compared by normalized text only"),
        },
    }

    Ok(())
}
