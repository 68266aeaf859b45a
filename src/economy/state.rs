use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DUNGEON_LEVEL;

/// Canonical player progression record.
///
/// This is the only state that is persisted. Every field defaults so that a
/// missing or partially populated record (first run, older save) still loads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub coins: f64,
    pub gems: f64,
    pub click_upgrade_level: u32,
    pub auto_fire_level: u32,
    pub gem_level: u32,
    /// dungeon id -> current level (absent = level 1)
    pub dungeon_progress: BTreeMap<String, u32>,
}

impl PlayerState {
    pub fn dungeon_level(&self, dungeon_id: &str) -> u32 {
        self.dungeon_progress
            .get(dungeon_id)
            .copied()
            .unwrap_or(DEFAULT_DUNGEON_LEVEL)
    }

    /// Repair values that violate the state invariants.
    ///
    /// Only externally supplied data (loaded saves, host-provided JSON) can
    /// break them; in-session mutations are validated at the boundary.
    pub fn sanitized(mut self) -> Self {
        if !self.coins.is_finite() || self.coins < 0.0 {
            tracing::warn!(target: "idle_core::economy", coins = self.coins, "Repairing invalid coin balance");
            self.coins = 0.0;
        }
        if !self.gems.is_finite() || self.gems < 0.0 {
            tracing::warn!(target: "idle_core::economy", gems = self.gems, "Repairing invalid gem balance");
            self.gems = 0.0;
        }
        for (dungeon, level) in self.dungeon_progress.iter_mut() {
            if *level < DEFAULT_DUNGEON_LEVEL {
                tracing::warn!(target: "idle_core::economy", dungeon = %dungeon, "Repairing dungeon level 0");
                *level = DEFAULT_DUNGEON_LEVEL;
            }
        }
        self
    }
}
