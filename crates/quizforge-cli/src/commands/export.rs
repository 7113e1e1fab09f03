//! The `quizforge export` command: re-render a saved JSON report.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::report::SessionReport;

use super::shared::{print_summary, save_outputs};

pub fn execute(input: PathBuf, output: PathBuf, format: String) -> Result<()> {
    let report = SessionReport::load_json(&input)?;
    print_summary(&report);

    let written = save_outputs(&report, &output, &format, None)?;
    anyhow::ensure!(!written.is_empty(), "no known format in '{format}'");
    Ok(())
}
