use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::history::check_universe;
use crate::models::DEFAULT_MAX_NUMBER;

/// Minimum window length any run requires, whatever the parameters.
pub const MIN_HISTORY: usize = 10;

/// Parameters of one strategy run. Every field is validated by [`StrategyConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Size of the analysis window (most recent draws).
    pub recent_n: usize,
    /// Maximum size of the hot set.
    pub top_n: usize,
    /// Over-heat window: numbers seen twice or more here are excluded.
    pub exclude_recent: usize,
    /// Monte-Carlo trials per pair.
    pub simulations: usize,
    /// Draws sampled per trial.
    pub sample_size: usize,
    pub seed: u64,
    pub max_number: u8,
    /// Ceiling on `simulations`, bounding the cost of a run.
    pub max_simulations: usize,
    /// Estimate pairs in parallel, each with its own derived generator.
    pub parallel: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            recent_n: 63,
            top_n: 13,
            exclude_recent: 3,
            simulations: 5096,
            sample_size: 3,
            seed: 66,
            max_number: DEFAULT_MAX_NUMBER,
            max_simulations: 200_000,
            parallel: false,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        check_universe(self.max_number)?;
        for (name, value) in [
            ("recent_n", self.recent_n),
            ("top_n", self.top_n),
            ("exclude_recent", self.exclude_recent),
            ("simulations", self.simulations),
            ("sample_size", self.sample_size),
            ("max_simulations", self.max_simulations),
        ] {
            if value == 0 {
                return Err(EngineError::validation("config", format!("{} must be >= 1", name)));
            }
        }
        if self.exclude_recent > self.recent_n {
            return Err(EngineError::validation(
                "config",
                format!(
                    "exclude_recent ({}) > recent_n ({})",
                    self.exclude_recent, self.recent_n
                ),
            ));
        }
        if self.simulations > self.max_simulations {
            return Err(EngineError::validation(
                "config",
                format!(
                    "simulations ({}) above ceiling ({})",
                    self.simulations, self.max_simulations
                ),
            ));
        }
        Ok(())
    }

    /// Smallest analysis window this configuration can run on.
    pub fn required_history(&self) -> usize {
        self.sample_size.max(self.exclude_recent).max(MIN_HISTORY)
    }
}
