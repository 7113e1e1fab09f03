//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::model::Difficulty;
use quizforge_core::parser::{self, LoadedBank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        parser::load_bank_directory(&bank_path)?
    } else {
        vec![LoadedBank {
            bank: parser::load_bank(&bank_path)?,
            path: bank_path,
        }]
    };

    if banks.is_empty() {
        anyhow::bail!("no question banks found");
    }

    let mut total_warnings = 0;

    for loaded in &banks {
        let bank = &loaded.bank;
        let tiers = bank.tier_counts();
        let count = |tier: Difficulty| tiers.get(&tier).copied().unwrap_or(0);
        println!(
            "Bank: {} ({} questions: {} easy, {} medium, {} hard; {} topics)",
            loaded.name(),
            bank.questions.len(),
            count(Difficulty::Easy),
            count(Difficulty::Medium),
            count(Difficulty::Hard),
            bank.topics().len()
        );

        for skipped in &bank.skipped {
            println!("  WARNING: skipped record, {skipped}");
        }

        let warnings = parser::validate_bank(&bank.questions);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [#{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len() + bank.skipped.len();
    }

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
