//! Flat CSV export of a session, one row per answered question.
//!
//! Free-text fields have commas and line breaks replaced by a single space
//! instead of being quoted, so the file opens cleanly in any spreadsheet.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use quizforge_core::report::SessionReport;

pub const CSV_HEADER: &str = "Question,Topic,Weight,SelectedAnswer,CorrectAnswer,Correct";

/// Replace CSV-breaking characters with a single space.
fn sanitize(field: &str) -> String {
    field
        .replace("\r\n", " ")
        .replace(['\n', '\r', ','], " ")
}

/// Render the report as CSV text.
pub fn render_csv(report: &SessionReport) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for r in &report.responses {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{}",
            sanitize(&r.question_text),
            sanitize(r.topic.as_deref().unwrap_or("")),
            r.weight,
            sanitize(&r.selected_answer),
            sanitize(&r.correct_answer),
            if r.is_correct { "True" } else { "False" },
        );
    }

    // quoted so spreadsheets do not read the score as a date
    let _ = writeln!(csv, "\nTotal Score,'{}'", report.score_label());

    csv.push_str("Knowledge States:\n");
    for (topic, mastery) in &report.mastery {
        let _ = writeln!(csv, "{},{:.2}", sanitize(topic), mastery);
    }

    csv
}

/// `<Mode>_QuizResults_Level<level>_<yyyyMMdd_HHmmss>.csv`
pub fn csv_file_name(report: &SessionReport, at: &DateTime<Local>) -> String {
    format!(
        "{}_QuizResults_Level{}_{}.csv",
        report.mode.label(),
        report.level,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Write the CSV into `dir` under a timestamped name and return its path.
pub fn write_csv_report(report: &SessionReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(csv_file_name(report, &Local::now()));
    write_csv_to(report, &path)?;
    Ok(path)
}

/// Write the CSV to an exact path.
pub fn write_csv_to(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory for {}", path.display()))?;
    }
    std::fs::write(path, render_csv(report))
        .with_context(|| format!("failed to write CSV report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_report;
    use chrono::TimeZone;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("a,b"), "a b");
        assert_eq!(sanitize("line one\nline two"), "line one line two");
        assert_eq!(sanitize("crlf\r\nend"), "crlf end");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn rows_follow_layout() {
        let report = make_report();
        let csv = render_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();

        // header + responses + blank + score + knowledge header + topics
        assert_eq!(
            lines.len(),
            1 + report.responses.len() + 1 + 1 + 1 + report.mastery.len()
        );
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "Simplify 2x  4x,Algebra,2,6x,6x,True");
        assert_eq!(
            lines[2],
            "What is 7 x 8? Show work.,Arithmetic,1,54,56,False"
        );
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "Total Score,'2/20'");
        assert_eq!(lines[6], "Knowledge States:");
        assert_eq!(lines[7], "Algebra,0.81");
        assert_eq!(lines[8], "Arithmetic,0.16");
    }

    #[test]
    fn every_row_has_six_columns() {
        let report = make_report();
        let csv = render_csv(&report);
        for line in csv.lines().skip(1).take(report.responses.len()) {
            assert_eq!(line.split(',').count(), 6, "{line}");
        }
    }

    #[test]
    fn file_name_uses_mode_level_and_timestamp() {
        let report = make_report();
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            csv_file_name(&report, &at),
            "Dynamic_QuizResults_Level3_20240309_140507.csv"
        );
    }

    #[test]
    fn write_into_directory() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv_report(&report, &dir.path().join("results")).unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Dynamic_QuizResults_Level3_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_csv(&report));
    }

    #[test]
    fn write_failure_names_path_and_keeps_report() {
        let report = make_report();
        let before = render_csv(&report);

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let path = blocker.join("results.csv");

        let err = write_csv_to(&report, &path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains(&path.display().to_string()), "{message}");
        assert!(!path.exists());
        assert_eq!(render_csv(&report), before);
        assert_eq!(report.responses.len(), 3);
    }
}
