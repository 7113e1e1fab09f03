//! Session and file-level configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::knowledge::BayesParams;
use crate::model::SelectionPolicy;
use crate::selector::AdaptiveSettings;

/// How a session picks its questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionMode {
    /// Tier adapts to the learner's answers.
    #[default]
    Adaptive,
    /// A fixed number of questions from each tier, served Easy → Hard.
    Fixed {
        #[serde(default = "default_easy_count")]
        easy: usize,
        #[serde(default = "default_medium_count")]
        medium: usize,
        #[serde(default = "default_hard_count")]
        hard: usize,
    },
}

impl SessionMode {
    /// Fixed mode with the 7/7/6 composition.
    pub fn fixed() -> Self {
        SessionMode::Fixed {
            easy: default_easy_count(),
            medium: default_medium_count(),
            hard: default_hard_count(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionMode::Adaptive => "Dynamic",
            SessionMode::Fixed { .. } => "Static",
        }
    }
}

fn default_easy_count() -> usize {
    7
}
fn default_medium_count() -> usize {
    7
}
fn default_hard_count() -> usize {
    6
}

/// Everything `start_session` needs besides the bank text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Questions to serve in adaptive mode.
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    /// Correct answers in a tier before moving up.
    #[serde(default = "default_correct_to_level_up")]
    pub correct_to_level_up: u32,
    /// Wrong answers in a tier before moving down.
    #[serde(default = "default_wrong_to_level_down")]
    pub wrong_to_level_down: u32,
    #[serde(default)]
    pub selection_policy: SelectionPolicy,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default)]
    pub bayes: BayesParams,
    /// Selected level; names the bank file and the exported report.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Fixed RNG seed for reproducible sessions.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_total_questions() -> usize {
    20
}
fn default_correct_to_level_up() -> u32 {
    3
}
fn default_wrong_to_level_down() -> u32 {
    2
}
fn default_level() -> u32 {
    1
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            correct_to_level_up: default_correct_to_level_up(),
            wrong_to_level_down: default_wrong_to_level_down(),
            selection_policy: SelectionPolicy::default(),
            mode: SessionMode::default(),
            bayes: BayesParams::default(),
            level: default_level(),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_questions == 0 {
            return Err(ConfigError::ZeroTotal);
        }
        if self.correct_to_level_up == 0 {
            return Err(ConfigError::ZeroThreshold {
                name: "correct_to_level_up",
            });
        }
        if self.wrong_to_level_down == 0 {
            return Err(ConfigError::ZeroThreshold {
                name: "wrong_to_level_down",
            });
        }
        if let SessionMode::Fixed { easy, medium, hard } = self.mode {
            if easy + medium + hard == 0 {
                return Err(ConfigError::EmptyComposition);
            }
        }
        self.bayes.validate()
    }

    pub fn adaptive_settings(&self) -> AdaptiveSettings {
        AdaptiveSettings {
            total_questions: self.total_questions,
            correct_to_level_up: self.correct_to_level_up,
            wrong_to_level_down: self.wrong_to_level_down,
            policy: self.selection_policy,
        }
    }
}

/// Top-level `quizforge.toml` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub session: SessionConfig,
    /// Directory holding `<bank_base_name><level>.txt` files.
    #[serde(default = "default_bank_dir")]
    pub bank_dir: PathBuf,
    #[serde(default = "default_bank_base_name")]
    pub bank_base_name: String,
    /// Where exported reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Pause between an answer and the next question, in milliseconds.
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_ms: u64,
}

fn default_bank_dir() -> PathBuf {
    PathBuf::from("banks")
}
fn default_bank_base_name() -> String {
    "questions".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quiz-results")
}
fn default_pacing_delay() -> u64 {
    2000
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            bank_dir: default_bank_dir(),
            bank_base_name: default_bank_base_name(),
            output_dir: default_output_dir(),
            pacing_delay_ms: default_pacing_delay(),
        }
    }
}

impl QuizConfig {
    /// Bank file for a level, e.g. `banks/questions2.txt`.
    pub fn bank_path_for_level(&self, level: u32) -> PathBuf {
        self.bank_dir
            .join(format!("{}{}.txt", self.bank_base_name, level))
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_BANK_DIR`, `QUIZFORGE_SEED`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(dir) = std::env::var("QUIZFORGE_BANK_DIR") {
        config.bank_dir = PathBuf::from(dir);
    }
    if let Ok(seed) = std::env::var("QUIZFORGE_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("QUIZFORGE_SEED is not an integer: {seed}"))?;
        config.session.seed = Some(seed);
    }

    config
        .session
        .validate()
        .context("invalid [session] configuration")?;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}
