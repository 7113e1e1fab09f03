//! Per-topic mastery estimates with a weight-scaled Bayesian update.
//!
//! Each topic carries the probability that the learner has mastered it.
//! After an answer the prior is replaced by
//!
//! ```text
//! correct:   p·Lc / (p·Lc + (1-p)·Ln)
//! incorrect: p·(1-Lc) / (p·(1-Lc) + (1-p)·(1-Ln))
//! ```
//!
//! where `Lc`/`Ln` are the likelihoods of a correct answer given mastery and
//! non-mastery. Heavier questions push the two likelihoods further apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Mastery assigned to a topic the first time it is seen.
pub const INITIAL_MASTERY: f64 = 0.5;

/// Base likelihoods of a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesParams {
    /// P(correct | topic mastered).
    pub likelihood_mastered: f64,
    /// P(correct | topic not mastered).
    pub likelihood_unmastered: f64,
}

impl BayesParams {
    pub const STANDARD: BayesParams = BayesParams {
        likelihood_mastered: 0.85,
        likelihood_unmastered: 0.20,
    };

    pub const CONSERVATIVE: BayesParams = BayesParams {
        likelihood_mastered: 0.80,
        likelihood_unmastered: 0.20,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("likelihood_mastered", self.likelihood_mastered),
            ("likelihood_unmastered", self.likelihood_unmastered),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::LikelihoodOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// `(Lc, Ln)` for a question of the given weight.
    pub fn likelihoods(&self, weight: u8) -> (f64, f64) {
        let weight_factor = (f64::from(weight) - 1.0) * 0.2;
        let lc = (self.likelihood_mastered + weight_factor * 0.10).clamp(0.0, 1.0);
        let ln = (self.likelihood_unmastered - weight_factor * 0.10).clamp(0.0, 1.0);
        (lc, ln)
    }
}

impl Default for BayesParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One Bayesian step. A non-positive denominator leaves the prior unchanged.
pub fn posterior(prior: f64, was_correct: bool, weight: u8, params: &BayesParams) -> f64 {
    let (lc, ln) = params.likelihoods(weight);

    let (numerator, denominator) = if was_correct {
        let numerator = prior * lc;
        (numerator, numerator + (1.0 - prior) * ln)
    } else {
        let numerator = prior * (1.0 - lc);
        (numerator, numerator + (1.0 - prior) * (1.0 - ln))
    };

    let updated = if denominator > 0.0 {
        numerator / denominator
    } else {
        prior
    };
    updated.clamp(0.0, 1.0)
}

/// Topic → mastery map for a single session.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeTracker {
    params: BayesParams,
    states: BTreeMap<String, f64>,
}

impl KnowledgeTracker {
    pub fn new(params: BayesParams) -> Self {
        Self {
            params,
            states: BTreeMap::new(),
        }
    }

    /// Tracker with every given topic at [`INITIAL_MASTERY`]. Empty names are ignored.
    pub fn with_topics<I, S>(topics: I, params: BayesParams) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::new(params);
        for topic in topics {
            let topic = topic.into();
            if !topic.is_empty() {
                tracker.states.entry(topic).or_insert(INITIAL_MASTERY);
            }
        }
        tracker
    }

    /// Current mastery, or [`INITIAL_MASTERY`] for an unseen topic.
    pub fn mastery(&self, topic: &str) -> f64 {
        self.states.get(topic).copied().unwrap_or(INITIAL_MASTERY)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Known topics with their mastery, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.states.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.states.clone()
    }

    /// Fold one answer into the topic's mastery and return the new value.
    ///
    /// An empty topic is not tracked; the neutral prior is returned.
    pub fn update(&mut self, topic: &str, was_correct: bool, weight: u8) -> f64 {
        if topic.is_empty() {
            return INITIAL_MASTERY;
        }

        let params = self.params;
        let state = self
            .states
            .entry(topic.to_string())
            .or_insert(INITIAL_MASTERY);
        let prior = *state;
        *state = posterior(prior, was_correct, weight, &params);

        tracing::debug!(
            topic,
            was_correct,
            weight,
            "topic mastery {:.0}% -> {:.0}%",
            prior * 100.0,
            *state * 100.0
        );

        *state
    }
}
