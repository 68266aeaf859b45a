//! Notifications published to the presentation layer.
//!
//! The core never calls into the presentation; it queues typed events that
//! the host drains once per frame (or receives as Bevy events via the plugin).

use serde::{Deserialize, Serialize};

use crate::combat::CritProfile;
use crate::economy::StatBonus;
use crate::rewards::RewardResult;

/// Everything a UI needs to redraw the economy panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub coins: f64,
    pub gems: f64,
    pub click_upgrade_level: u32,
    pub auto_fire_level: u32,
    pub gem_level: u32,
    pub damage: f64,
    pub auto_fire_rate: f64,
    /// None while auto-fire is disabled (level 0)
    pub auto_fire_interval_ms: Option<f64>,
    pub next_click_cost: f64,
    pub next_auto_fire_cost: f64,
    pub next_gem_cost: f64,
    pub bonus: StatBonus,
    pub crit: CritProfile,
}

/// Emitted exactly once per boss defeat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDefeated {
    pub dungeon_id: String,
    /// Level that was fought
    pub dungeon_level: u32,
    /// Dungeon level after the defeat was recorded
    pub new_level: u32,
    pub reward: RewardResult,
    pub hits_taken: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    StatsChanged(StatsSnapshot),
    BossSpawned {
        dungeon_id: String,
        dungeon_level: u32,
        max_hp: f64,
    },
    BossDamaged {
        dungeon_id: String,
        damage: f64,
        remaining_hp: f64,
        max_hp: f64,
        is_crit: bool,
        is_super_crit: bool,
    },
    BossDefeated(BossDefeated),
    SaveFailed {
        reason: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StatsChanged(_) => "StatsChanged",
            Self::BossSpawned { .. } => "BossSpawned",
            Self::BossDamaged { .. } => "BossDamaged",
            Self::BossDefeated(_) => "BossDefeated",
            Self::SaveFailed { .. } => "SaveFailed",
        }
    }
}
