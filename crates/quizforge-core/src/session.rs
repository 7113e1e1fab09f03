//! The session API the presentation layer drives.
//!
//! A session alternates strictly between [`Session::next_question`] and
//! [`Session::submit_answer`]; exactly one question is in flight at a time.
//! Pacing between questions is left to the caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SessionConfig, SessionMode};
use crate::error::SessionError;
use crate::fixed::FixedSelector;
use crate::knowledge::KnowledgeTracker;
use crate::model::{Difficulty, Question, OPTION_COUNT};
use crate::parser::parse_bank_lenient;
use crate::pools::DifficultyPools;
use crate::recorder::{SessionHeader, SessionRecorder};
use crate::report::SessionReport;
use crate::selector::{AdaptiveSelector, QuestionSelector, TierChange};

/// What the caller shows for a served question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    /// 1-based position in the session.
    pub number: usize,
    /// Planned session length.
    pub total: usize,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub difficulty: Difficulty,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextQuestion {
    Question(QuestionPrompt),
    Complete,
}

/// Result of [`Session::submit_answer`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_index: usize,
    pub correct_option: String,
    /// Topic mastery after the update; `None` for questions without a topic.
    pub mastery: Option<f64>,
    /// Tier the next question will start from.
    pub tier: Difficulty,
    pub tier_change: Option<TierChange>,
    /// Running score.
    pub score: usize,
}

struct InFlight {
    number: usize,
    question: Question,
    served_tier: Difficulty,
}

/// A single quiz session.
pub struct Session {
    selector: Box<dyn QuestionSelector>,
    recorder: SessionRecorder,
    in_flight: Option<InFlight>,
    finished: bool,
}

/// Start a session over `bank_text`.
///
/// Uses `config.seed` when set, otherwise an entropy-seeded generator.
pub fn start_session(bank_text: &str, config: &SessionConfig) -> Result<Session, SessionError> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Session::with_rng(bank_text, config, rng)
}

impl Session {
    /// Start a session with an explicit random source.
    pub fn with_rng<R: Rng + 'static>(
        bank_text: &str,
        config: &SessionConfig,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        if bank_text.trim().is_empty() {
            return Err(SessionError::MissingBank);
        }
        config.validate()?;

        let bank = parse_bank_lenient(bank_text)?;
        let knowledge = KnowledgeTracker::with_topics(bank.topics(), config.bayes);
        let pools = DifficultyPools::build(bank.questions, &mut rng);
        let available = pools.remaining_total();

        let selector: Box<dyn QuestionSelector> = match config.mode {
            SessionMode::Adaptive => Box::new(AdaptiveSelector::new(
                pools,
                knowledge,
                config.adaptive_settings(),
                rng,
            )),
            SessionMode::Fixed { easy, medium, hard } => Box::new(FixedSelector::compose(
                pools, easy, medium, hard, knowledge,
            )),
        };

        let recorder = SessionRecorder::new(SessionHeader {
            mode: config.mode,
            level: config.level,
            policy: config.selection_policy,
            total_questions: selector.planned_total(),
        });

        tracing::info!(
            session = %recorder.id(),
            mode = config.mode.label(),
            policy = %config.selection_policy,
            level = config.level,
            questions = available,
            skipped = bank.skipped.len(),
            "session started"
        );

        Ok(Self {
            selector,
            recorder,
            in_flight: None,
            finished: false,
        })
    }

    /// Serve the next question, or report that the session is over.
    pub fn next_question(&mut self) -> Result<NextQuestion, SessionError> {
        if let Some(pending) = &self.in_flight {
            return Err(SessionError::AnswerPending {
                number: pending.number,
            });
        }

        let Some(question) = self.selector.next() else {
            if !self.finished {
                self.finished = true;
                tracing::info!(
                    session = %self.recorder.id(),
                    score = self.recorder.score(),
                    answered = self.recorder.responses().len(),
                    "session finished"
                );
            }
            return Ok(NextQuestion::Complete);
        };

        let number = self.recorder.responses().len() + 1;
        let prompt = QuestionPrompt {
            number,
            total: self.selector.planned_total(),
            text: question.text.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty,
            topic: question.topic.clone(),
        };
        self.in_flight = Some(InFlight {
            number,
            served_tier: self.selector.current_tier(),
            question,
        });
        Ok(NextQuestion::Question(prompt))
    }

    /// Grade the answer to the question in flight.
    ///
    /// An out-of-range option leaves the question in flight.
    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerFeedback, SessionError> {
        let pending = match self.in_flight.take() {
            None => return Err(SessionError::NoQuestionInFlight),
            Some(pending) if option_index >= OPTION_COUNT => {
                self.in_flight = Some(pending);
                return Err(SessionError::InvalidOption {
                    index: option_index,
                });
            }
            Some(pending) => pending,
        };

        let question = &pending.question;
        let outcome = self.selector.submit(question, option_index);
        self.recorder
            .record(question, pending.served_tier, option_index, &outcome);

        Ok(AnswerFeedback {
            correct: outcome.correct,
            correct_index: question.correct_index,
            correct_option: question.correct_option().to_string(),
            mastery: outcome.mastery,
            tier: outcome.tier,
            tier_change: outcome.tier_change,
            score: self.recorder.score(),
        })
    }

    /// Whether a question is waiting for an answer.
    pub fn is_awaiting_answer(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Correct option of the question in flight. Used by simulated learners.
    pub fn answer_key(&self) -> Option<usize> {
        self.in_flight.as_ref().map(|p| p.question.correct_index)
    }

    /// True once no further question will be served.
    pub fn is_complete(&self) -> bool {
        self.finished
            || (self.in_flight.is_none()
                && self.selector.served() >= self.selector.planned_total())
    }

    pub fn score(&self) -> usize {
        self.recorder.score()
    }

    pub fn current_tier(&self) -> Difficulty {
        self.selector.current_tier()
    }

    pub fn knowledge(&self) -> &KnowledgeTracker {
        self.selector.knowledge()
    }

    /// Report of the session so far; valid mid-session.
    pub fn report(&self) -> SessionReport {
        self.recorder.report(
            self.selector.current_tier(),
            self.selector.knowledge().snapshot(),
        )
    }
}
