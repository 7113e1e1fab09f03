//! The `quizforge play` command: an interactive session on the terminal.

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use quizforge_core::session::{start_session, AnswerFeedback, NextQuestion, QuestionPrompt};

use super::shared::{print_summary, read_bank, save_outputs, SessionArgs};

const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A line typed at the answer prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Option(usize),
    Quit,
}

/// Accepts `A`-`D` (any case) or `1`-`4`; `q`/`quit` ends the session.
fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(Input::Quit);
    }

    let mut chars = line.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    match c.to_ascii_uppercase() {
        'A'..='D' => Some(Input::Option(c.to_ascii_uppercase() as usize - 'A' as usize)),
        '1'..='4' => Some(Input::Option(c as usize - '1' as usize)),
        _ => None,
    }
}

fn show_prompt(prompt: &QuestionPrompt) {
    let topic = prompt
        .topic
        .as_deref()
        .map(|t| format!(" | {t}"))
        .unwrap_or_default();
    println!(
        "\nQuestion {}/{} [{}{}]",
        prompt.number,
        prompt.total,
        prompt.difficulty.label(),
        topic
    );
    println!("{}", prompt.text);
    for (letter, option) in OPTION_LETTERS.iter().zip(&prompt.options) {
        println!("  {letter}) {option}");
    }
}

fn show_feedback(feedback: &AnswerFeedback) {
    if feedback.correct {
        println!("Correct!");
    } else {
        println!(
            "Wrong. The answer was {}) {}",
            OPTION_LETTERS[feedback.correct_index], feedback.correct_option
        );
    }
    if let Some(mastery) = feedback.mastery {
        println!("Topic mastery: {:.1}%", mastery * 100.0);
    }
    if let Some(change) = feedback.tier_change {
        println!("Difficulty: {} -> {}", change.from.label(), change.to.label());
    }
}

pub async fn execute(
    args: SessionArgs,
    output: Option<PathBuf>,
    format: String,
    delay_ms: Option<u64>,
) -> Result<()> {
    let (config, bank_path) = args.resolve()?;
    let bank_text = read_bank(&bank_path)?;
    let mut session = start_session(&bank_text, &config.session)
        .with_context(|| format!("cannot start a session on {}", bank_path.display()))?;

    let delay = Duration::from_millis(delay_ms.unwrap_or(config.pacing_delay_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut cancelled = false;

    println!(
        "quizforge - {} quiz, level {} ({})",
        config.session.mode.label(),
        config.session.level,
        bank_path.display()
    );
    println!("Answer with A-D or 1-4; q quits.");

    while let NextQuestion::Question(prompt) = session.next_question()? {
        show_prompt(&prompt);

        let choice = loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break None;
            };
            match parse_input(&line) {
                Some(Input::Option(index)) => break Some(index),
                Some(Input::Quit) => break None,
                None => println!("Please answer A, B, C or D."),
            }
        };
        let Some(choice) = choice else {
            cancelled = true;
            break;
        };

        let feedback = session.submit_answer(choice)?;
        show_feedback(&feedback);

        if !delay.is_zero() && !session.is_complete() {
            tokio::time::sleep(delay).await;
        }
    }

    if cancelled {
        println!("\nSession ended early.");
    }

    let report = session.report();
    print_summary(&report);

    let output = output.unwrap_or(config.output_dir);
    save_outputs(&report, &output, &format, None)?;

    Ok(())
}
