//! Derived session statistics: accuracy by topic and tier, streaks, tier movement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::recorder::Response;

/// Answered/correct counts for one slice of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub answered: usize,
    pub correct: usize,
    /// `correct / answered`, or 0.0 for an empty bucket.
    pub accuracy: f64,
}

impl BucketStats {
    fn add(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
        self.accuracy = self.correct as f64 / self.answered as f64;
    }
}

/// Statistics over all responses of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub overall: BucketStats,
    /// Keyed by topic; questions without a topic are not listed.
    pub per_topic: BTreeMap<String, BucketStats>,
    /// Keyed by the question's own difficulty.
    pub per_difficulty: BTreeMap<Difficulty, BucketStats>,
    /// Longest run of consecutive correct answers.
    pub longest_streak: usize,
    /// Number of times the tier moved, from either streaks or mastery.
    pub tier_changes: usize,
}

/// Compute statistics from a session's responses, in answer order.
pub fn compute_session_stats(responses: &[Response]) -> SessionStats {
    let mut stats = SessionStats::default();
    let mut streak = 0usize;
    let mut last_tier: Option<Difficulty> = None;

    for r in responses {
        stats.overall.add(r.is_correct);
        stats
            .per_difficulty
            .entry(r.difficulty)
            .or_default()
            .add(r.is_correct);
        if let Some(topic) = r.topic.as_deref().filter(|t| !t.is_empty()) {
            stats
                .per_topic
                .entry(topic.to_string())
                .or_default()
                .add(r.is_correct);
        }

        if r.is_correct {
            streak += 1;
            stats.longest_streak = stats.longest_streak.max(streak);
        } else {
            streak = 0;
        }

        // tier walk: previous tier_after -> served_tier -> tier_after
        for tier in [r.served_tier, r.tier_after] {
            if last_tier.is_some_and(|prev| prev != tier) {
                stats.tier_changes += 1;
            }
            last_tier = Some(tier);
        }
    }

    stats
}
