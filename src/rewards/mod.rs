//! Reward issuance for boss defeats.
//!
//! Rewards scale with the same factor as boss HP so the payout per unit of
//! effort stays flat across levels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dungeon::DungeonCatalog;
use crate::economy::{level_pow, Economy};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardResult {
    pub dungeon_id: String,
    pub dungeon_level: u32,
    pub gems: f64,
    pub coins: f64,
}

impl RewardResult {
    pub fn is_empty(&self) -> bool {
        self.gems == 0.0 && self.coins == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct RewardIssuer {
    catalog: Arc<DungeonCatalog>,
    scaling: f64,
}

impl RewardIssuer {
    pub fn new(catalog: Arc<DungeonCatalog>, scaling: f64) -> Self {
        Self { catalog, scaling }
    }

    /// Pure reward computation; an unknown dungeon yields an empty reward
    pub fn compute_reward(&self, dungeon_id: &str, level: u32) -> RewardResult {
        let Some(def) = self.catalog.get(dungeon_id) else {
            tracing::warn!(target: "idle_core::rewards", dungeon = dungeon_id, level, "No reward definition for dungeon");
            return RewardResult {
                dungeon_id: dungeon_id.to_string(),
                dungeon_level: level,
                ..Default::default()
            };
        };
        let factor = level_pow(self.scaling, level.max(1) - 1);
        RewardResult {
            dungeon_id: dungeon_id.to_string(),
            dungeon_level: level,
            gems: (def.gem_reward * factor).floor(),
            coins: (def.coin_reward * factor).floor(),
        }
    }

    /// Credit the reward for defeating `dungeon_id` at `level`.
    ///
    /// Call exactly once per defeat; the boss state machine guarantees that.
    pub fn give_reward(&self, economy: &mut Economy, dungeon_id: &str, level: u32) -> RewardResult {
        let mut reward = self.compute_reward(dungeon_id, level);
        if let Err(e) = economy.add_gems(reward.gems) {
            tracing::warn!(target: "idle_core::rewards", error = %e, "Gem reward rejected");
            reward.gems = 0.0;
        }
        if let Err(e) = economy.add_currency(reward.coins) {
            tracing::warn!(target: "idle_core::rewards", error = %e, "Coin reward rejected");
            reward.coins = 0.0;
        }
        tracing::info!(
            target: "idle_core::rewards",
            dungeon = dungeon_id,
            level,
            gems = reward.gems,
            coins = reward.coins,
            "Reward granted"
        );
        reward
    }
}
