//! The `quizforge init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    if Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG).context("failed to write quizforge.toml")?;
        println!("Created quizforge.toml");
    }

    std::fs::create_dir_all("banks").context("failed to create banks/")?;
    let bank_path = Path::new("banks/questions1.txt");
    if bank_path.exists() {
        println!("banks/questions1.txt already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK).context("failed to write sample bank")?;
        println!("Created banks/questions1.txt");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/questions1.txt or add banks/questions2.txt, ...");
    println!("  2. Run: quizforge validate --bank banks");
    println!("  3. Run: quizforge play --level 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

bank_dir = "banks"
bank_base_name = "questions"
output_dir = "./quiz-results"
pacing_delay_ms = 2000

[session]
level = 1
total_questions = 20
correct_to_level_up = 3
wrong_to_level_down = 2
selection_policy = "confidence_weighted"

[session.mode]
type = "adaptive"
# type = "fixed"
# easy = 7
# medium = 7
# hard = 6

[session.bayes]
likelihood_mastered = 0.85
likelihood_unmastered = 0.20
"#;

const SAMPLE_BANK: &str = include_str!("../../../../banks/questions1.txt");
