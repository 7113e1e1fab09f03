//! Append-only record of the answers given in a session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionMode;
use crate::model::{Difficulty, Question, SelectionPolicy};
use crate::report::SessionReport;
use crate::selector::AnswerOutcome;
use crate::statistics::compute_session_stats;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// 1-based position in the session.
    pub number: usize,
    pub question_id: usize,
    pub question_text: String,
    pub topic: Option<String>,
    pub weight: u8,
    /// The question's own difficulty.
    pub difficulty: Difficulty,
    /// Adaptive tier when the question was served.
    pub served_tier: Difficulty,
    pub selected_index: usize,
    pub selected_answer: String,
    pub correct_index: usize,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Topic mastery after this answer, when the question has a topic.
    pub mastery_after: Option<f64>,
    pub tier_after: Difficulty,
    pub answered_at: DateTime<Utc>,
}

/// Fixed facts about a session, copied into its report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionHeader {
    pub mode: SessionMode,
    pub level: u32,
    pub policy: SelectionPolicy,
    pub total_questions: usize,
}

#[derive(Debug, Clone)]
pub struct SessionRecorder {
    id: Uuid,
    started_at: DateTime<Utc>,
    header: SessionHeader,
    responses: Vec<Response>,
    score: usize,
}

impl SessionRecorder {
    pub fn new(header: SessionHeader) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            header,
            responses: Vec::new(),
            score: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append the graded answer to `question`.
    pub fn record(
        &mut self,
        question: &Question,
        served_tier: Difficulty,
        selected_index: usize,
        outcome: &AnswerOutcome,
    ) -> &Response {
        if outcome.correct {
            self.score += 1;
        }

        self.responses.push(Response {
            number: self.responses.len() + 1,
            question_id: question.id,
            question_text: question.text.clone(),
            topic: question.topic.clone(),
            weight: question.weight,
            difficulty: question.difficulty,
            served_tier,
            selected_index,
            selected_answer: question.options[selected_index].clone(),
            correct_index: question.correct_index,
            correct_answer: question.correct_option().to_string(),
            is_correct: outcome.correct,
            mastery_after: outcome.mastery,
            tier_after: outcome.tier,
            answered_at: Utc::now(),
        });
        &self.responses[self.responses.len() - 1]
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Snapshot the session so far. Can be called at any point.
    pub fn report(&self, final_tier: Difficulty, mastery: BTreeMap<String, f64>) -> SessionReport {
        SessionReport {
            id: self.id,
            created_at: self.started_at,
            mode: self.header.mode,
            level: self.header.level,
            policy: self.header.policy,
            total_questions: self.header.total_questions,
            score: self.score,
            final_tier,
            mastery,
            responses: self.responses.clone(),
            statistics: compute_session_stats(&self.responses),
        }
    }
}
