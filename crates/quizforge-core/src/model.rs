//! Core data model types for quizforge.
//!
//! Questions are created by the bank parser and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Lowest and highest question weight.
pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 3;

/// Difficulty tier, used both to bucket questions and as adaptive state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// One tier up, saturating at `Hard`.
    pub fn promoted(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One tier down, saturating at `Easy`.
    pub fn demoted(self) -> Self {
        match self {
            Difficulty::Easy | Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }

    /// Map a bank `Level:` number (1, 2, 3) to a tier.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The inline tag recognized in `Q:` lines, e.g. `(Easy)`.
    pub fn tag(self) -> &'static str {
        match self {
            Difficulty::Easy => "(Easy)",
            Difficulty::Medium => "(Medium)",
            Difficulty::Hard => "(Hard)",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Position of the question in its bank (0-based).
    pub id: usize,
    /// Question body; may span several lines.
    pub text: String,
    /// The four answer options, in `A)`..`D)` order.
    pub options: [String; OPTION_COUNT],
    /// Zero-based index into `options`.
    pub correct_index: usize,
    pub difficulty: Difficulty,
    /// Topic used for mastery tracking. `None` opts out of tracking.
    #[serde(default)]
    pub topic: Option<String>,
    /// Informativeness multiplier in `1..=3`.
    pub weight: u8,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Topic name, or the empty string when the question has none.
    pub fn topic_name(&self) -> &str {
        self.topic.as_deref().unwrap_or("")
    }

    pub fn is_correct(&self, chosen: usize) -> bool {
        chosen == self.correct_index
    }
}

/// How the next question is chosen from the pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Pop from the shuffled tier pool; no topic sampling, no mastery override.
    Plain,
    /// Sample a topic weighted by lack of mastery, then draw within it.
    #[default]
    ConfidenceWeighted,
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Plain => write!(f, "plain"),
            SelectionPolicy::ConfidenceWeighted => write!(f, "confidence_weighted"),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "plain" | "random" => Ok(SelectionPolicy::Plain),
            "confidence_weighted" | "weighted" => Ok(SelectionPolicy::ConfidenceWeighted),
            other => Err(format!("unknown selection policy: {other}")),
        }
    }
}
