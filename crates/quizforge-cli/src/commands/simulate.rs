//! The `quizforge simulate` command: run sessions against a simulated learner.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quizforge_core::report::SessionReport;
use quizforge_core::session::{start_session, NextQuestion};

use super::shared::{print_summary, read_bank, save_outputs, SessionArgs};

/// Play one session, answering correctly with probability `accuracy`.
fn run_once<R: Rng>(
    bank_text: &str,
    config: &quizforge_core::config::SessionConfig,
    accuracy: f64,
    learner: &mut R,
) -> Result<SessionReport> {
    let mut session = start_session(bank_text, config)?;

    while let NextQuestion::Question(_) = session.next_question()? {
        let key = session
            .answer_key()
            .context("served question has no answer key")?;
        let choice = if learner.random_bool(accuracy) {
            key
        } else {
            // any of the three wrong options
            (key + learner.random_range(1..4)) % 4
        };
        session.submit_answer(choice)?;
    }

    Ok(session.report())
}

pub fn execute(
    args: SessionArgs,
    accuracy: f64,
    runs: usize,
    output: Option<PathBuf>,
    format: Option<String>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&accuracy),
        "accuracy must be between 0.0 and 1.0"
    );
    anyhow::ensure!(runs >= 1, "runs must be at least 1");

    let (mut config, bank_path) = args.resolve()?;
    let base_seed = config.session.seed;
    let bank_text = read_bank(&bank_path)?;

    let mut learner = match base_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };

    let mut reports = Vec::with_capacity(runs);
    for run in 0..runs {
        config.session.seed = base_seed.map(|seed| seed.wrapping_add(run as u64 * 2));
        let report = run_once(&bank_text, &config.session, accuracy, &mut learner)
            .with_context(|| format!("simulation on {} failed", bank_path.display()))?;
        reports.push(report);
    }

    if let [report] = reports.as_slice() {
        print_summary(report);
    } else {
        print_runs(&reports);
    }

    if let Some(format) = format {
        let output = output.unwrap_or_else(|| config.output_dir.clone());
        let batch = reports.len() > 1;
        for (i, report) in reports.iter().enumerate() {
            save_outputs(report, &output, &format, batch.then_some(i + 1))?;
        }
    }

    Ok(())
}

fn print_runs(reports: &[SessionReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Run",
        "Score",
        "Accuracy",
        "Longest Streak",
        "Tier Changes",
        "Final Tier",
    ]);

    for (i, report) in reports.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(report.score_label()),
            Cell::new(format!("{:.1}%", report.accuracy() * 100.0)),
            Cell::new(report.statistics.longest_streak),
            Cell::new(report.statistics.tier_changes),
            Cell::new(report.final_tier.label()),
        ]);
    }
    println!("{table}");

    let mean_score =
        reports.iter().map(|r| r.score as f64).sum::<f64>() / reports.len() as f64;
    println!("Mean score: {mean_score:.2} over {} runs", reports.len());
}
