//! Per-difficulty question pools with without-replacement draws.

use rand::Rng;

use crate::model::{Difficulty, Question};

/// Unbiased in-place Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let k = rng.random_range(0..=i);
        items.swap(i, k);
    }
}

/// Which questions a draw may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolScope {
    Tier(Difficulty),
    /// Every question still outstanding, across all tiers.
    Remaining,
}

/// Location of an outstanding question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub tier: Difficulty,
    pub index: usize,
}

/// The not-yet-served questions of a session, bucketed by difficulty.
#[derive(Debug, Clone, Default)]
pub struct DifficultyPools {
    easy: Vec<Question>,
    medium: Vec<Question>,
    hard: Vec<Question>,
}

impl DifficultyPools {
    /// Partition `questions` by difficulty and shuffle each pool.
    pub fn build<R: Rng>(questions: impl IntoIterator<Item = Question>, rng: &mut R) -> Self {
        let mut pools = Self::default();
        for q in questions {
            pools.pool_mut(q.difficulty).push(q);
        }
        for tier in Difficulty::ALL {
            shuffle(pools.pool_mut(tier), rng);
        }
        pools
    }

    pub fn pool(&self, tier: Difficulty) -> &[Question] {
        match tier {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn pool_mut(&mut self, tier: Difficulty) -> &mut Vec<Question> {
        match tier {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    pub fn remaining(&self, tier: Difficulty) -> usize {
        self.pool(tier).len()
    }

    pub fn remaining_total(&self) -> usize {
        self.easy.len() + self.medium.len() + self.hard.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_total() == 0
    }

    /// Remove and return the next question of `tier`, if any.
    pub fn draw(&mut self, tier: Difficulty) -> Option<Question> {
        self.pool_mut(tier).pop()
    }

    /// The tier's pool when it still has questions, otherwise the whole bank.
    pub fn scope_for(&self, tier: Difficulty) -> PoolScope {
        if self.pool(tier).is_empty() {
            PoolScope::Remaining
        } else {
            PoolScope::Tier(tier)
        }
    }

    /// Outstanding questions in `scope`, optionally restricted to `topic`.
    pub fn candidates(&self, scope: PoolScope, topic: Option<&str>) -> Vec<Slot> {
        let tiers: &[Difficulty] = match scope {
            PoolScope::Tier(ref tier) => std::slice::from_ref(tier),
            PoolScope::Remaining => &Difficulty::ALL,
        };

        tiers
            .iter()
            .flat_map(|&tier| {
                self.pool(tier)
                    .iter()
                    .enumerate()
                    .filter(move |(_, q)| topic.map_or(true, |t| q.topic.as_deref() == Some(t)))
                    .map(move |(index, _)| Slot { tier, index })
            })
            .collect()
    }

    /// Remove the question at `slot`. Panics if the slot is stale.
    pub fn take(&mut self, slot: Slot) -> Question {
        self.pool_mut(slot.tier).remove(slot.index)
    }

    /// Draw up to `easy`/`medium`/`hard` questions from each pool, in tier order.
    pub fn compose(&mut self, easy: usize, medium: usize, hard: usize) -> Vec<Question> {
        let mut selected = Vec::with_capacity(easy + medium + hard);
        for (tier, count) in [
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ] {
            for _ in 0..count {
                match self.draw(tier) {
                    Some(q) => selected.push(q),
                    None => break,
                }
            }
        }
        selected
    }
}
