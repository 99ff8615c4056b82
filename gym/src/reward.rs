use serde::{Deserialize, Serialize};
use tetris_core::tetris::Command;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RewardConfig {
    /// Survival bonus paid every step, and the unit of the other terms.
    pub base_reward: f64,
    /// Row count the stack height is measured against.
    pub height_baseline: usize,
    pub height_penalty_scale: f64,
    pub hard_drop_multiplier: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_reward: 0.04,
            height_baseline: 26,
            height_penalty_scale: 250.0,
            hard_drop_multiplier: 25.0,
        }
    }
}

/// Index of the first row holding a settled cell, or the row count if the board is empty.
pub fn top_row(cells: &[Vec<bool>]) -> usize {
    cells
        .iter()
        .position(|row| row.iter().any(|c| *c))
        .unwrap_or(cells.len())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardShaper {
    config: RewardConfig,
    last_max_height: usize,
}

impl RewardShaper {
    pub const fn new(config: RewardConfig) -> Self {
        Self {
            config,
            last_max_height: 0,
        }
    }

    pub const fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Height the penalty is measured from. Starts at zero and is never raised.
    // TODO: track the highest stack reached per episode once the penalty is meant to
    // punish regressions instead of absolute height.
    pub const fn last_max_height(&self) -> usize {
        self.last_max_height
    }

    pub fn shape(
        &self,
        score_before: u32,
        score_after: u32,
        command: Command,
        cells: &[Vec<bool>],
    ) -> f64 {
        let RewardConfig {
            base_reward,
            height_baseline,
            height_penalty_scale,
            hard_drop_multiplier,
        } = self.config;

        let score_delta = f64::from(score_after) - f64::from(score_before);
        let climb = height_baseline
            .saturating_sub(top_row(cells))
            .saturating_sub(self.last_max_height);
        let height_penalty = climb as f64 * base_reward * height_penalty_scale;

        let mut reward = score_delta - height_penalty + base_reward;
        match command {
            Command::SoftDrop => reward += base_reward,
            Command::HardDrop => reward += base_reward * hard_drop_multiplier,
            _ => {}
        }
        reward
    }
}
