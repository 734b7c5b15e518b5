//! The `dikduk init` command.

use std::path::Path;

use anyhow::Result;

use dikduk_core::grammar::GrammarConfig;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("dikduk.toml"), SAMPLE_CONFIG)?;

    let grammar = GrammarConfig::builtin().to_toml_string()?;
    write_if_missing(
        Path::new("grammar.toml"),
        &format!("{GRAMMAR_HEADER}{grammar}"),
    )?;

    std::fs::create_dir_all("assignments")?;
    write_if_missing(Path::new("assignments/example.toml"), EXAMPLE_ASSIGNMENT)?;

    std::fs::create_dir_all("answers")?;
    write_if_missing(Path::new("answers/example.json"), EXAMPLE_ANSWERS)?;

    println!("\nNext steps:");
    println!("  1. Edit grammar.toml to add accepted spellings");
    println!("  2. Run: dikduk validate --assignment assignments/example.toml");
    println!(
        "  3. Run: dikduk grade --assignment assignments/example.toml --answers answers/example.json"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# dikduk configuration

# Grammar table with accepted spellings; the built-in table is used when unset.
grammar_path = "grammar.toml"

# "proportional" (correct fields / required fields) or "fixed_points"
scoring_policy = "proportional"
parallelism = 4
output_dir = "./dikduk-results"
"#;

const GRAMMAR_HEADER: &str = "# dikduk grammar table\n\
# Each entry's `variants` lists the spellings accepted for `value`.\n\n";

const EXAMPLE_ASSIGNMENT: &str = r#"[assignment]
id = "example"
title = "Example assignment"
instructions = "Give the shoresh, binyan, zman and guf of each highlighted verb."

[[sentences]]
sentence_number = 1
full_sentence = "הילד כתב מכתב לסבתא"
analyzed_word = "כתב"
correct_shoresh = "כ.ת.ב"
correct_binyan = "פעל"
correct_zman = "עבר"
correct_guf = "נסתר"

[[sentences]]
sentence_number = 2
full_sentence = "הילדה רוצה לשחק בחוץ"
analyzed_word = "לשחק"
correct_shoresh = "ש.ח.ק"
correct_binyan = "פיעל"
correct_zman = "שם פועל"

[[sentences]]
sentence_number = 3

[sentences.question]
question_type = "compare_grammatical_components"
instruction = "What do 'כתב' and 'נכתב' have in common?"

[sentences.question.correct_answer]
components = ["שורש", "זמן"]
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "assignment_id": "example",
  "student_id": "student-1",
  "answers": [
    { "sentence_number": 1, "student_shoresh": "כתב", "student_binyan": "קל", "student_zman": "עבר", "student_guf": "נסתר" },
    { "sentence_number": 2, "student_shoresh": "שחק", "student_binyan": "פעל", "student_zman": "שם פועל" },
    {
      "sentence_number": 3,
      "answer_data": { "question_type": "compare_grammatical_components", "selected_components": ["שורש", "זמן"] }
    }
  ]
}
"#;
