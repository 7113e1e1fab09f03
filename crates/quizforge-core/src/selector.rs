//! Adaptive question selection.
//!
//! Two mechanisms move the current difficulty tier:
//!
//! - a mastery override applied right after a question is drawn, based on
//!   the drawn question's topic mastery;
//! - a streak rule applied after each answer, promoting after
//!   `correct_to_level_up` correct answers in a tier and demoting after
//!   `wrong_to_level_down` wrong ones.
//!
//! Both run every turn. The override runs inside [`AdaptiveSelector::next`]
//! and the streak rule inside [`QuestionSelector::submit`], so the tier a
//! caller observes before the following `next` call is the streak result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeTracker;
use crate::model::{Difficulty, Question, SelectionPolicy};
use crate::pools::{DifficultyPools, PoolScope};

/// Floor on a topic's sampling weight so mastered topics still appear.
pub const MIN_TOPIC_WEIGHT: f64 = 0.01;

/// Mastery at or above which the tier jumps to `Hard`.
pub const MASTERY_HARD: f64 = 0.8;
/// Mastery at or above which `Easy` moves up to `Medium`.
pub const MASTERY_MEDIUM: f64 = 0.6;
/// Mastery at or below which the tier drops back to `Easy`.
pub const MASTERY_EASY: f64 = 0.4;

/// What moved the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierChangeCause {
    Streak,
    Mastery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChange {
    pub from: Difficulty,
    pub to: Difficulty,
    pub cause: TierChangeCause,
}

/// Current tier plus the streak counters that drive promotion and demotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierState {
    pub current: Difficulty,
    pub easy_correct: u32,
    pub medium_correct: u32,
    pub hard_correct: u32,
    pub wrong_in_tier: u32,
}

impl TierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correct_count(&self, tier: Difficulty) -> u32 {
        match tier {
            Difficulty::Easy => self.easy_correct,
            Difficulty::Medium => self.medium_correct,
            Difficulty::Hard => self.hard_correct,
        }
    }

    fn correct_count_mut(&mut self, tier: Difficulty) -> &mut u32 {
        match tier {
            Difficulty::Easy => &mut self.easy_correct,
            Difficulty::Medium => &mut self.medium_correct,
            Difficulty::Hard => &mut self.hard_correct,
        }
    }

    /// Streak transition; resets the wrong counter and the left tier's correct counter.
    fn shift(&mut self, to: Difficulty) -> TierChange {
        let from = self.current;
        *self.correct_count_mut(from) = 0;
        self.wrong_in_tier = 0;
        self.current = to;
        TierChange {
            from,
            to,
            cause: TierChangeCause::Streak,
        }
    }

    /// Count an answer at the current tier and apply the streak thresholds.
    pub fn record_answer(
        &mut self,
        correct: bool,
        correct_to_level_up: u32,
        wrong_to_level_down: u32,
    ) -> Option<TierChange> {
        if correct {
            *self.correct_count_mut(self.current) += 1;
        } else {
            self.wrong_in_tier += 1;
        }

        let mut change = None;

        if self.current != Difficulty::Hard
            && self.correct_count(self.current) >= correct_to_level_up
        {
            let to = self.current.promoted();
            change = Some(self.shift(to));
        }

        if self.current != Difficulty::Easy && self.wrong_in_tier >= wrong_to_level_down {
            let to = self.current.demoted();
            change = Some(self.shift(to));
        }

        change
    }

    /// Jump tiers from the mastery of the question just drawn.
    ///
    /// Streak counts are kept; only the wrong counter restarts with the new tier.
    pub fn apply_mastery(&mut self, mastery: f64) -> Option<TierChange> {
        let from = self.current;
        let to = if mastery >= MASTERY_HARD {
            Difficulty::Hard
        } else if mastery >= MASTERY_MEDIUM && from == Difficulty::Easy {
            Difficulty::Medium
        } else if mastery <= MASTERY_EASY {
            Difficulty::Easy
        } else {
            from
        };

        if to == from {
            return None;
        }
        self.current = to;
        self.wrong_in_tier = 0;
        Some(TierChange {
            from,
            to,
            cause: TierChangeCause::Mastery,
        })
    }
}

/// Result of grading one answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Topic mastery after the update; `None` for questions without a topic.
    pub mastery: Option<f64>,
    /// Tier after the answer has been processed.
    pub tier: Difficulty,
    pub tier_change: Option<TierChange>,
}

/// Strategy that serves questions and grades answers for a session.
pub trait QuestionSelector {
    /// Serve the next question, or `None` when the session is over.
    fn next(&mut self) -> Option<Question>;

    /// Grade `chosen` for `question` and update the learner model.
    fn submit(&mut self, question: &Question, chosen: usize) -> AnswerOutcome;

    /// Tier the session is in: after `next`, the tier the served question
    /// is attributed to; after `submit`, the tier the next draw starts from.
    fn current_tier(&self) -> Difficulty;

    fn knowledge(&self) -> &KnowledgeTracker;

    /// Number of questions this session is planned to serve.
    fn planned_total(&self) -> usize;

    /// Questions served so far.
    fn served(&self) -> usize;
}

/// Knobs for [`AdaptiveSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveSettings {
    pub total_questions: usize,
    pub correct_to_level_up: u32,
    pub wrong_to_level_down: u32,
    pub policy: SelectionPolicy,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            total_questions: 20,
            correct_to_level_up: 3,
            wrong_to_level_down: 2,
            policy: SelectionPolicy::ConfidenceWeighted,
        }
    }
}

/// Adaptive selector over shuffled difficulty pools.
#[derive(Debug)]
pub struct AdaptiveSelector<R> {
    pools: DifficultyPools,
    knowledge: KnowledgeTracker,
    tier: TierState,
    settings: AdaptiveSettings,
    served: usize,
    rng: R,
}

impl<R: Rng> AdaptiveSelector<R> {
    pub fn new(
        pools: DifficultyPools,
        knowledge: KnowledgeTracker,
        settings: AdaptiveSettings,
        rng: R,
    ) -> Self {
        Self {
            pools,
            knowledge,
            tier: TierState::new(),
            settings,
            served: 0,
            rng,
        }
    }

    pub fn tier_state(&self) -> &TierState {
        &self.tier
    }

    pub fn pools(&self) -> &DifficultyPools {
        &self.pools
    }

    /// Roulette-wheel topic pick, favoring less-mastered topics.
    pub fn select_topic(&mut self) -> Option<String> {
        let weights: Vec<(&str, f64)> = self
            .knowledge
            .iter()
            .map(|(topic, mastery)| (topic, (1.0 - mastery).max(MIN_TOPIC_WEIGHT)))
            .collect();
        if weights.is_empty() {
            return None;
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let r = self.rng.random::<f64>() * total;

        let mut cumulative = 0.0;
        for (topic, weight) in &weights {
            cumulative += weight;
            if r <= cumulative {
                return Some((*topic).to_string());
            }
        }
        weights.first().map(|(topic, _)| (*topic).to_string())
    }

    fn draw_plain(&mut self) -> Option<Question> {
        if let Some(q) = self.pools.draw(self.tier.current) {
            return Some(q);
        }
        let slots = self.pools.candidates(PoolScope::Remaining, None);
        if slots.is_empty() {
            return None;
        }
        let slot = slots[self.rng.random_range(0..slots.len())];
        Some(self.pools.take(slot))
    }

    fn draw_weighted(&mut self) -> Option<Question> {
        let scope = self.pools.scope_for(self.tier.current);
        let topic = self.select_topic();

        let mut slots = self.pools.candidates(scope, topic.as_deref());
        if slots.is_empty() {
            slots = self.pools.candidates(scope, None);
        }
        if slots.is_empty() {
            return None;
        }

        let slot = slots[self.rng.random_range(0..slots.len())];
        let question = self.pools.take(slot);

        let mastery = self.knowledge.mastery(question.topic_name());
        if let Some(change) = self.tier.apply_mastery(mastery) {
            tracing::debug!(
                from = %change.from,
                to = %change.to,
                mastery,
                "tier override from topic mastery"
            );
        }

        Some(question)
    }
}

impl<R: Rng> QuestionSelector for AdaptiveSelector<R> {
    fn next(&mut self) -> Option<Question> {
        if self.served >= self.settings.total_questions {
            return None;
        }

        let question = match self.settings.policy {
            SelectionPolicy::Plain => self.draw_plain(),
            SelectionPolicy::ConfidenceWeighted => self.draw_weighted(),
        }?;

        self.served += 1;
        Some(question)
    }

    fn submit(&mut self, question: &Question, chosen: usize) -> AnswerOutcome {
        let correct = question.is_correct(chosen);
        let mastery = question
            .topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|topic| self.knowledge.update(topic, correct, question.weight));

        let tier_change = self.tier.record_answer(
            correct,
            self.settings.correct_to_level_up,
            self.settings.wrong_to_level_down,
        );
        if let Some(change) = tier_change {
            tracing::debug!(from = %change.from, to = %change.to, "tier change from streak");
        }

        AnswerOutcome {
            correct,
            mastery,
            tier: self.tier.current,
            tier_change,
        }
    }

    fn current_tier(&self) -> Difficulty {
        self.tier.current
    }

    fn knowledge(&self) -> &KnowledgeTracker {
        &self.knowledge
    }

    fn planned_total(&self) -> usize {
        self.settings.total_questions
    }

    fn served(&self) -> usize {
        self.served
    }
}
