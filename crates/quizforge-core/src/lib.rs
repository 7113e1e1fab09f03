//! quizforge-core — Adaptive question selection for multiple-choice quizzes.
//!
//! This crate parses question banks, tracks per-topic mastery with a
//! Bayesian update, picks questions through a difficulty-tier state machine,
//! and records each session into a serializable report.

pub mod config;
pub mod error;
pub mod fixed;
pub mod knowledge;
pub mod model;
pub mod parser;
pub mod pools;
pub mod recorder;
pub mod report;
pub mod selector;
pub mod session;
pub mod statistics;

pub use config::{QuizConfig, SessionConfig, SessionMode};
pub use error::{BankError, ConfigError, ParseError, SessionError};
pub use model::{Difficulty, Question, SelectionPolicy};
pub use report::SessionReport;
pub use session::{start_session, AnswerFeedback, NextQuestion, QuestionPrompt, Session};
