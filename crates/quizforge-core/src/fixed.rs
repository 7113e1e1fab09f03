//! Fixed-composition sessions: a pre-drawn Easy → Medium → Hard sequence.

use crate::knowledge::KnowledgeTracker;
use crate::model::{Difficulty, Question};
use crate::pools::DifficultyPools;
use crate::selector::{AnswerOutcome, QuestionSelector};

/// Serves a shuffled, tier-ordered selection without adapting difficulty.
///
/// Mastery is still tracked so the report has the same shape as an
/// adaptive session.
#[derive(Debug)]
pub struct FixedSelector {
    sequence: Vec<Question>,
    position: usize,
    knowledge: KnowledgeTracker,
}

impl FixedSelector {
    /// Take up to the given number of questions from each tier.
    pub fn compose(
        mut pools: DifficultyPools,
        easy: usize,
        medium: usize,
        hard: usize,
        knowledge: KnowledgeTracker,
    ) -> Self {
        Self {
            sequence: pools.compose(easy, medium, hard),
            position: 0,
            knowledge,
        }
    }
}

impl QuestionSelector for FixedSelector {
    fn next(&mut self) -> Option<Question> {
        let question = self.sequence.get(self.position)?.clone();
        self.position += 1;
        Some(question)
    }

    fn submit(&mut self, question: &Question, chosen: usize) -> AnswerOutcome {
        let correct = question.is_correct(chosen);
        let mastery = question
            .topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|topic| self.knowledge.update(topic, correct, question.weight));

        AnswerOutcome {
            correct,
            mastery,
            tier: question.difficulty,
            tier_change: None,
        }
    }

    fn current_tier(&self) -> Difficulty {
        self.position
            .checked_sub(1)
            .and_then(|last| self.sequence.get(last))
            .or_else(|| self.sequence.first())
            .map(|q| q.difficulty)
            .unwrap_or_default()
    }

    fn knowledge(&self) -> &KnowledgeTracker {
        &self.knowledge
    }

    fn planned_total(&self) -> usize {
        self.sequence.len()
    }

    fn served(&self) -> usize {
        self.position
    }
}
