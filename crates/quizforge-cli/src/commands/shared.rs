//! Option handling and output helpers shared by the session commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};

use quizforge_core::config::{load_config_from, QuizConfig, SessionMode};
use quizforge_core::model::SelectionPolicy;
use quizforge_core::report::SessionReport;
use quizforge_report::csv::{csv_file_name, write_csv_to};
use quizforge_report::html::write_html_report;

/// Flags that pick the bank and shape the session. Each one overrides the
/// matching `quizforge.toml` value.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Question bank file (takes precedence over --level)
    #[arg(long)]
    pub bank: Option<PathBuf>,

    /// Level whose bank is loaded from the configured bank directory
    #[arg(long)]
    pub level: Option<u32>,

    /// Session mode: adaptive or fixed
    #[arg(long)]
    pub mode: Option<String>,

    /// Selection policy: confidence-weighted or plain
    #[arg(long)]
    pub policy: Option<String>,

    /// Number of questions in an adaptive session
    #[arg(long)]
    pub questions: Option<usize>,

    /// Seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse `adaptive`/`fixed`, keeping configured fixed counts when present.
fn parse_mode(value: &str, current: SessionMode) -> Result<SessionMode> {
    match value.to_lowercase().as_str() {
        "adaptive" | "dynamic" => Ok(SessionMode::Adaptive),
        "fixed" | "static" => Ok(match current {
            SessionMode::Fixed { .. } => current,
            SessionMode::Adaptive => SessionMode::fixed(),
        }),
        other => anyhow::bail!("unknown mode '{other}' (expected adaptive or fixed)"),
    }
}

impl SessionArgs {
    /// Merge the flags over the loaded config and locate the bank file.
    pub fn resolve(&self) -> Result<(QuizConfig, PathBuf)> {
        let mut config = load_config_from(self.config.as_deref())?;
        let session = &mut config.session;

        if let Some(level) = self.level {
            session.level = level;
        }
        if let Some(mode) = &self.mode {
            session.mode = parse_mode(mode, session.mode)?;
        }
        if let Some(policy) = &self.policy {
            session.selection_policy = policy
                .parse::<SelectionPolicy>()
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(questions) = self.questions {
            session.total_questions = questions;
        }
        if self.seed.is_some() {
            session.seed = self.seed;
        }
        session.validate()?;

        let bank = self
            .bank
            .clone()
            .unwrap_or_else(|| config.bank_path_for_level(config.session.level));
        Ok((config, bank))
    }
}

pub fn read_bank(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))
}

/// Expand a `--format` value into individual formats.
pub fn parse_formats(format: &str) -> Vec<&str> {
    if format == "all" {
        vec!["csv", "json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    }
}

/// Write the report in each requested format into `output`.
///
/// `run` tags the file names so reports of one batch do not overwrite each other.
pub fn save_outputs(
    report: &SessionReport,
    output: &Path,
    format: &str,
    run: Option<usize>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;

    let mut stem = csv_file_name(report, &chrono::Local::now())
        .trim_end_matches(".csv")
        .to_string();
    if let Some(run) = run {
        stem.push_str(&format!("_run{run}"));
    }
    let mut written = Vec::new();

    for fmt in parse_formats(format) {
        match fmt {
            "csv" => {
                let path = output.join(format!("{stem}.csv"));
                write_csv_to(report, &path)?;
                eprintln!("CSV results: {}", path.display());
                written.push(path);
            }
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
                written.push(path);
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
                written.push(path);
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(written)
}

/// Print the score line, a summary table and the knowledge states.
pub fn print_summary(report: &SessionReport) {
    println!("\nScore: {}", report.score_label());

    let stats = &report.statistics;
    let mut table = Table::new();
    table.set_header(vec![
        "Answered",
        "Accuracy",
        "Longest Streak",
        "Tier Changes",
        "Final Tier",
    ]);
    table.add_row(vec![
        Cell::new(report.answered()),
        Cell::new(format!("{:.1}%", stats.overall.accuracy * 100.0)),
        Cell::new(stats.longest_streak),
        Cell::new(stats.tier_changes),
        Cell::new(report.final_tier.label()),
    ]);
    println!("{table}");

    if !report.mastery.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Topic", "Mastery", "Answered", "Correct"]);
        for (topic, mastery) in &report.mastery {
            let bucket = stats.per_topic.get(topic).copied().unwrap_or_default();
            table.add_row(vec![
                Cell::new(topic),
                Cell::new(format!("{:.1}%", mastery * 100.0)),
                Cell::new(bucket.answered),
                Cell::new(bucket.correct),
            ]);
        }
        println!("Topic Mastery (Estimates):\n{table}");
    }
}
