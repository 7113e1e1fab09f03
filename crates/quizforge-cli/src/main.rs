//! quizforge CLI — play, simulate and export adaptive quiz sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::shared::SessionArgs;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Adaptive multiple-choice quiz engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check question bank files for errors
    Validate {
        /// Path to a bank file or a directory of banks
        #[arg(long)]
        bank: PathBuf,
    },

    /// Take a quiz interactively on the terminal
    Play {
        #[command(flatten)]
        session: SessionArgs,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: csv, json, html, all
        #[arg(long, default_value = "csv")]
        format: String,

        /// Pause after each answer in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Run sessions against a simulated learner
    Simulate {
        #[command(flatten)]
        session: SessionArgs,

        /// Probability that the learner answers correctly
        #[arg(long, default_value = "0.7")]
        accuracy: f64,

        /// Number of sessions to run
        #[arg(long, default_value = "1")]
        runs: usize,

        /// Output directory (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save each report in these formats: csv, json, html, all
        #[arg(long)]
        format: Option<String>,
    },

    /// Render a saved JSON report as CSV/HTML
    Export {
        /// Report JSON written by play or simulate
        #[arg(long)]
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./quiz-results")]
        output: PathBuf,

        /// Output format: csv, json, html, all
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Create a starter config and sample question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Play {
            session,
            output,
            format,
            delay_ms,
        } => commands::play::execute(session, output, format, delay_ms).await,
        Commands::Simulate {
            session,
            accuracy,
            runs,
            output,
            format,
        } => commands::simulate::execute(session, accuracy, runs, output, format),
        Commands::Export {
            input,
            output,
            format,
        } => commands::export::execute(input, output, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
