//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LEVEL_BANK: &str = "../../banks/questions1.txt";
const TAGGED_BANK: &str = "../../banks/questions2.txt";

fn quizforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizforge").unwrap()
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect()
}

#[test]
fn validate_level_bank() {
    quizforge()
        .arg("validate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .assert()
        .success()
        .stdout(predicate::str::contains("27 questions: 9 easy, 9 medium, 9 hard"))
        .stdout(predicate::str::contains("All banks valid"));
}

#[test]
fn validate_directory() {
    quizforge()
        .arg("validate")
        .arg("--bank")
        .arg("../../banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank: questions1"))
        .stdout(predicate::str::contains("Bank: questions2 (21 questions"));
}

#[test]
fn validate_reports_skipped_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.txt");
    std::fs::write(
        &path,
        "Q: Good?\nTopic: T\nA) a\nB) b\nC) c\nD) d\nAnswer: 0\n\nQ: Bad?\nA) a\nB) b\nAnswer: 0\n",
    )
    .unwrap();

    quizforge()
        .arg("validate")
        .arg("--bank")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 questions"))
        .stdout(predicate::str::contains("WARNING: skipped record"));
}

#[test]
fn validate_nonexistent_file() {
    quizforge()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_empty_bank_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "\n\n").unwrap();

    quizforge()
        .arg("validate")
        .arg("--bank")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no question bank assigned"));
}

#[test]
fn simulate_perfect_learner() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--accuracy")
        .arg("1.0")
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 20/20"))
        .stdout(predicate::str::contains("Hard"));
}

#[test]
fn simulate_failing_learner() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--accuracy")
        .arg("0")
        .arg("--seed")
        .arg("7")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0/20"));
}

#[test]
fn simulate_fixed_mode() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(TAGGED_BANK)
        .arg("--mode")
        .arg("fixed")
        .arg("--accuracy")
        .arg("1")
        .arg("--seed")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 20/20"));
}

#[test]
fn simulate_multiple_runs() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--runs")
        .arg("3")
        .arg("--seed")
        .arg("5")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean score"));
}

#[test]
fn simulate_multiple_runs_keeps_every_report() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--runs")
        .arg("3")
        .arg("--seed")
        .arg("5")
        .arg("--format")
        .arg("csv,json")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success();

    let csvs = files_with_extension(dir.path(), "csv");
    assert_eq!(csvs.len(), 3);
    assert_eq!(files_with_extension(dir.path(), "json").len(), 3);

    let mut names: Vec<String> = csvs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for (i, name) in names.iter().enumerate() {
        assert!(name.starts_with("Dynamic_QuizResults_Level1_"), "{name}");
        assert!(name.ends_with(&format!("_run{}.csv", i + 1)), "{name}");
    }
}

#[test]
fn simulate_rejects_bad_accuracy() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--accuracy")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("accuracy"));
}

#[test]
fn simulate_rejects_bad_policy() {
    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--policy")
        .arg("smart")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown selection policy"));
}

#[test]
fn missing_level_bank_fails() {
    let dir = TempDir::new().unwrap();
    quizforge()
        .current_dir(dir.path())
        .arg("simulate")
        .arg("--level")
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("questions9.txt"));
}

#[test]
fn simulate_writes_csv() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--level")
        .arg("2")
        .arg("--seed")
        .arg("11")
        .arg("--format")
        .arg("csv")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success();

    let csvs = files_with_extension(dir.path(), "csv");
    assert_eq!(csvs.len(), 1);
    let name = csvs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Dynamic_QuizResults_Level2_"), "{name}");

    let content = std::fs::read_to_string(&csvs[0]).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "Question,Topic,Weight,SelectedAnswer,CorrectAnswer,Correct"
    );
    assert_eq!(lines[21], "");
    assert!(lines[22].starts_with("Total Score,'"));
    assert_eq!(lines[23], "Knowledge States:");
}

#[test]
fn play_from_stdin() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .arg("play")
        .arg("--bank")
        .arg(LEVEL_BANK)
        .arg("--questions")
        .arg("3")
        .arg("--seed")
        .arg("1")
        .arg("--delay-ms")
        .arg("0")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("x\nA\n2\nc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/3"))
        .stdout(predicate::str::contains("Question 3/3"))
        .stdout(predicate::str::contains("Please answer A, B, C or D."))
        .stdout(predicate::str::contains("Score: "));

    assert_eq!(files_with_extension(dir.path(), "csv").len(), 1);
}

#[test]
fn play_quit_keeps_partial_results() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .arg("play")
        .arg("--bank")
        .arg(TAGGED_BANK)
        .arg("--delay-ms")
        .arg("0")
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(dir.path())
        .write_stdin("B\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ended early."));

    let reports = files_with_extension(dir.path(), "json");
    assert_eq!(reports.len(), 1);
    let content = std::fs::read_to_string(&reports[0]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["responses"].as_array().unwrap().len(), 1);
    assert_eq!(json["total_questions"], 20);
}

#[test]
fn export_saved_report() {
    let dir = TempDir::new().unwrap();
    let json_dir = dir.path().join("json");
    let export_dir = dir.path().join("export");

    quizforge()
        .arg("simulate")
        .arg("--bank")
        .arg(TAGGED_BANK)
        .arg("--seed")
        .arg("21")
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&json_dir)
        .assert()
        .success();

    let reports = files_with_extension(&json_dir, "json");
    assert_eq!(reports.len(), 1);

    quizforge()
        .arg("export")
        .arg("--input")
        .arg(&reports[0])
        .arg("--format")
        .arg("csv,html")
        .arg("--output")
        .arg(&export_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: "));

    assert_eq!(files_with_extension(&export_dir, "csv").len(), 1);
    let html = files_with_extension(&export_dir, "html");
    assert_eq!(html.len(), 1);
    assert!(std::fs::read_to_string(&html[0])
        .unwrap()
        .contains("Knowledge States"));
}

#[test]
fn export_nonexistent_report() {
    quizforge()
        .arg("export")
        .arg("--input")
        .arg("no_such_report.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_report.json"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizforge.toml"))
        .stdout(predicate::str::contains("Created banks/questions1.txt"));

    assert!(dir.path().join("quizforge.toml").exists());
    assert!(dir.path().join("banks/questions1.txt").exists());

    // the generated project is immediately playable
    quizforge()
        .current_dir(dir.path())
        .arg("simulate")
        .arg("--seed")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: "));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    quizforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adaptive multiple-choice quiz engine"));
}

#[test]
fn version_output() {
    quizforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizforge"));
}
