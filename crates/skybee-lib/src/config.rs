//! Tunable parameters for the Q-learning planner.
//!
//! Training cost grows with `episodes` times graph size, so every knob is
//! exposed here and can be loaded from JSON:
//!
//! ```json
//! { "episodes": 400, "seed": 7, "time_budget_ms": 2000 }
//! ```
//!
//! Missing fields fall back to [`QLearningConfig::default`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Q-learning hyperparameters and resource limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Number of training episodes per query.
    pub episodes: usize,
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Exploration floor reached as episodes progress.
    pub min_epsilon: f64,
    /// Exploration rate of the first episode.
    pub max_epsilon: f64,
    /// Exponential decay rate of epsilon per episode.
    pub epsilon_decay: f64,
    /// Reward for a transition that lands on the destination.
    pub goal_reward: f64,
    /// Maximum hops taken while extracting the greedy path.
    pub max_steps: usize,
    /// Maximum transitions in a single training episode.
    pub max_episode_steps: usize,
    /// Seed for the episode sampler. A fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Wall-clock budget for training, in milliseconds.
    pub time_budget_ms: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            alpha: 0.4,
            gamma: 0.9,
            min_epsilon: 0.01,
            max_epsilon: 1.0,
            epsilon_decay: 0.005,
            goal_reward: 1000.0,
            max_steps: 100,
            max_episode_steps: 1000,
            seed: None,
            time_budget_ms: None,
        }
    }
}

impl QLearningConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(u64::try_from(budget.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Exploration rate for the zero-based episode `episode`.
    pub fn epsilon(&self, episode: usize) -> f64 {
        self.min_epsilon
            + (self.max_epsilon - self.min_epsilon) * (-self.epsilon_decay * episode as f64).exp()
    }

    /// Reject parameter combinations that make training meaningless.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(Error::InvalidConfig { message }) };

        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return invalid(format!("alpha must be in (0, 1], got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.min_epsilon) || !(0.0..=1.0).contains(&self.max_epsilon) {
            return invalid("epsilon bounds must lie in [0, 1]".to_string());
        }
        if self.min_epsilon > self.max_epsilon {
            return invalid(format!(
                "min_epsilon {} exceeds max_epsilon {}",
                self.min_epsilon, self.max_epsilon
            ));
        }
        if !self.epsilon_decay.is_finite() || self.epsilon_decay < 0.0 {
            return invalid(format!(
                "epsilon_decay must be finite and non-negative, got {}",
                self.epsilon_decay
            ));
        }
        if !self.goal_reward.is_finite() {
            return invalid("goal_reward must be finite".to_string());
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be at least 1".to_string());
        }
        if self.max_episode_steps == 0 {
            return invalid("max_episode_steps must be at least 1".to_string());
        }
        Ok(())
    }
}
