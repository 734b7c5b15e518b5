//! The `dikduk grammar` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use dikduk_core::config::load_config_from;
use dikduk_core::grammar::{GrammarConfig, GrammarField};

use super::parse_grammar_field;

pub fn execute(field: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let grammar = config.grammar()?;

    let fields = match field {
        Some(name) => vec![parse_grammar_field(&name)?],
        None => vec![GrammarField::Binyan, GrammarField::Zman, GrammarField::Guf],
    };

    for field in fields {
        print_table(&grammar, field);
    }
    Ok(())
}

fn print_table(grammar: &GrammarConfig, field: GrammarField) {
    let title = match field {
        GrammarField::Binyan => "Binyan (בניין)",
        GrammarField::Zman => "Zman (זמן)",
        GrammarField::Guf => "Guf (גוף)",
    };

    let mut table = Table::new();
    table.set_header(vec!["Value", "Label", "Accepted", "Notes"]);
    for opt in grammar.options(field) {
        let notes = [opt.group.as_deref(), opt.gender.as_deref(), opt.example.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("; ");
        table.add_row(vec![
            Cell::new(&opt.value),
            Cell::new(&opt.label),
            Cell::new(opt.variants.join(", ")),
            Cell::new(notes),
        ]);
    }

    println!("{title}: {} values", grammar.options(field).len());
    println!("{table}\n");
}
