//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dikduk(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("dikduk").unwrap();
    cmd.env("HOME", home)
        .env_remove("DIKDUK_GRAMMAR")
        .env_remove("DIKDUK_OUTPUT_DIR");
    cmd
}

/// The single report file written into `dir`.
fn written_report(dir: &Path) -> PathBuf {
    let reports: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    assert_eq!(reports.len(), 1, "expected one report in {}", dir.display());
    reports.into_iter().next().unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn validate_basic_assignment() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .arg("validate")
        .arg("--assignment")
        .arg("../../assignments/binyanim-basics.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 sentences, 0 advanced"))
        .stdout(predicate::str::contains("All assignments valid"));
}

#[test]
fn validate_directory() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .arg("validate")
        .arg("--assignment")
        .arg("../../assignments")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 sentences, 4 advanced"))
        .stdout(predicate::str::contains("ניתוח פעלים"))
        .stdout(predicate::str::contains("All assignments valid"));
}

#[test]
fn validate_reports_warnings() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[assignment]
id = "bad"
title = "Bad"

[[sentences]]
sentence_number = 1
correct_shoresh = "כתב"
correct_binyan = "פעלול"
correct_zman = "עבר"
"#,
    )
    .unwrap();

    dikduk(home.path())
        .arg("validate")
        .arg("--assignment")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[#1] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .arg("validate")
        .arg("--assignment")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_basic_sheet() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/binyanim-basics.toml")
        .arg("--answers")
        .arg("../../answers/dana-basics.json")
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 89/100"))
        .stdout(predicate::str::contains("3/5 sentences fully correct"))
        .stderr(predicate::str::contains("5 complete, 0 partial, 0 empty"));

    let report = read_json(&written_report(out.path()));
    assert_eq!(report["total_score"], 89);
    assert_eq!(report["student_id"], "dana");
    assert_eq!(report["results"].as_array().unwrap().len(), 5);
    assert_eq!(
        report["results"][4]["outcome"]["correctness"]["guf_correct"],
        serde_json::Value::Null
    );
}

#[test]
fn grade_advanced_sheet_as_json() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/advanced.toml")
        .arg("--answers")
        .arg("../../answers/dana-advanced.json")
        .arg("--output")
        .arg(out.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // (10 + 7.5 + 5 + 10) / 40
    assert_eq!(report["total_score"], 81);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results[1]["outcome"]["question_type"], "common_binyan_and_roots");
    assert_eq!(results[1]["outcome"]["result"]["score"], 7.5);
    assert_eq!(results[3]["outcome"]["result"]["correct"], true);
}

#[test]
fn grade_markdown_output() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/advanced.toml")
        .arg("--answers")
        .arg("../../answers/dana-advanced.json")
        .arg("--output")
        .arg(out.path())
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("# שאלות מתקדמות"))
        .stdout(predicate::str::contains("### Advanced questions"))
        .stdout(predicate::str::contains("binyan 5.0, roots 2.5"));
}

#[test]
fn grade_rejects_sheet_for_other_assignment() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/advanced.toml")
        .arg("--answers")
        .arg("../../answers/dana-basics.json")
        .arg("--output")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("binyanim-basics"));
}

#[test]
fn grade_rejects_unknown_format() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/advanced.toml")
        .arg("--answers")
        .arg("../../answers/dana-advanced.json")
        .arg("--format")
        .arg("html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn approve_updates_report() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    dikduk(home.path())
        .arg("grade")
        .arg("--assignment")
        .arg("../../assignments/binyanim-basics.toml")
        .arg("--answers")
        .arg("../../answers/dana-basics.json")
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();
    let path = written_report(out.path());

    // 17/19 -> 18/19
    dikduk(home.path())
        .arg("approve")
        .arg("--report")
        .arg(&path)
        .arg("--sentence")
        .arg("3")
        .arg("--field")
        .arg("guf")
        .assert()
        .success()
        .stdout(predicate::str::contains("89/100 -> 95/100"));

    let report = read_json(&path);
    assert_eq!(report["total_score"], 95);
    assert_eq!(report["results"][2]["outcome"]["correctness"]["guf_correct"], true);

    // Sentence 5 is an infinitive: no guf to approve.
    dikduk(home.path())
        .arg("approve")
        .arg("--report")
        .arg(&path)
        .arg("--sentence")
        .arg("5")
        .arg("--field")
        .arg("גוף")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not graded for sentence"));
}

#[test]
fn check_with_expected() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .args(["check", "--field", "binyan", "--answer", "קַל", "--expected", "פעל"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct"));

    dikduk(home.path())
        .args(["check", "--field", "shoresh", "--answer", "כ.ת.ב", "--expected", "כתף"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect"));
}

#[test]
fn check_lists_matching_values() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .args(["check", "--field", "zman", "--answer", "בינוני"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted as zman: הווה"));
}

#[test]
fn check_unknown_field() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .args(["check", "--field", "mood", "--answer", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn grammar_prints_table() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .arg("grammar")
        .assert()
        .success()
        .stdout(predicate::str::contains("Binyan (בניין): 7 values"))
        .stdout(predicate::str::contains("Zman (זמן): 5 values"))
        .stdout(predicate::str::contains("Guf (גוף): 12 values"));

    dikduk(home.path())
        .args(["grammar", "--field", "shoresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no grammar table"));
}

#[test]
fn missing_config_file_is_an_error() {
    let home = TempDir::new().unwrap();
    dikduk(home.path())
        .args(["grammar", "--config", "no-such-config.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_files() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    dikduk(home.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created dikduk.toml"))
        .stdout(predicate::str::contains("Created grammar.toml"))
        .stdout(predicate::str::contains("Created assignments/example.toml"));

    assert!(dir.path().join("dikduk.toml").exists());
    assert!(dir.path().join("grammar.toml").exists());
    assert!(dir.path().join("answers/example.json").exists());
}

#[test]
fn init_skips_existing() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    // First init
    dikduk(home.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    dikduk(home.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_grade_example() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    dikduk(home.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    dikduk(home.path())
        .current_dir(dir.path())
        .args(["validate", "--assignment", "assignments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All assignments valid"));

    // 4/4 + 2/3 + one full advanced unit = 7/8
    dikduk(home.path())
        .current_dir(dir.path())
        .args([
            "grade",
            "--assignment",
            "assignments/example.toml",
            "--answers",
            "answers/example.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 88/100"));

    assert!(dir.path().join("dikduk-results").is_dir());
}
