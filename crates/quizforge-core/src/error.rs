//! Error types for bank parsing, configuration, and quiz sessions.
//!
//! Parse errors carry the 1-based line number of the offending line so a
//! bank author can jump straight to the defective record.

use thiserror::Error;

/// A defective record in a question-bank text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The record ended before all four `A)`..`D)` options were given.
    #[error("line {line}: record has {found} of 4 options")]
    IncompleteOptions { line: usize, found: usize },

    /// The `Answer:` value is not an integer.
    #[error("line {line}: unparsable answer index '{value}'")]
    InvalidAnswer { line: usize, value: String },

    /// The `Answer:` value is outside `0..=3`.
    #[error("line {line}: answer index {index} is out of range 0..=3")]
    AnswerOutOfRange { line: usize, index: i64 },

    /// The record ended without an `Answer:` line.
    #[error("line {line}: record ended without an Answer: line")]
    MissingAnswer { line: usize },

    /// The record has options and an answer but no `Q:` text.
    #[error("line {line}: record has no Q: line")]
    MissingQuestion { line: usize },

    /// An option or answer line appeared outside any record.
    #[error("line {line}: '{content}' is outside of a question record")]
    OrphanLine { line: usize, content: String },
}

impl ParseError {
    /// Line number the error was reported at.
    pub fn line(&self) -> usize {
        match self {
            ParseError::IncompleteOptions { line, .. }
            | ParseError::InvalidAnswer { line, .. }
            | ParseError::AnswerOutOfRange { line, .. }
            | ParseError::MissingAnswer { line }
            | ParseError::MissingQuestion { line }
            | ParseError::OrphanLine { line, .. } => *line,
        }
    }
}

/// Errors when turning a bank text into a usable question set.
#[derive(Debug, Error)]
pub enum BankError {
    /// No text was supplied at all.
    #[error("no question bank assigned")]
    Missing,

    /// Every record was malformed (or there were none).
    #[error("question bank contains no valid questions ({skipped} record(s) skipped)")]
    Empty { skipped: usize },

    /// Strict parsing rejected the bank.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("total_questions must be at least 1")]
    ZeroTotal,

    #[error("{name} must be at least 1")]
    ZeroThreshold { name: &'static str },

    #[error("fixed mode must select at least one question")]
    EmptyComposition,

    #[error("bayes likelihood {name} = {value} must lie strictly between 0 and 1")]
    LikelihoodOutOfRange { name: &'static str, value: f64 },
}

/// Errors raised by the session API.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Fails fast before any selector state is created.
    #[error("no question bank assigned")]
    MissingBank,

    #[error(transparent)]
    Bank(#[from] BankError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `next_question` was called while a served question is unanswered.
    #[error("question {number} is still awaiting an answer")]
    AnswerPending { number: usize },

    /// `submit_answer` was called with nothing in flight.
    #[error("no question is awaiting an answer")]
    NoQuestionInFlight,

    #[error("option index {index} is out of range 0..=3")]
    InvalidOption { index: usize },
}
