//! Boss encounter state machine: `Spawning -> Active -> Defeated`.
//!
//! The defeat transition is the only place dungeon progress advances and
//! rewards are paid, and it can fire at most once per encounter.

use serde::{Deserialize, Serialize};

use crate::dungeon::DungeonDef;
use crate::economy::Economy;
use crate::engine::config::BossConfig;
use crate::events::BossDefeated;
use crate::rewards::RewardIssuer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Spawning,
    Active,
    Defeated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DamageOutcome {
    /// Encounter not accepting damage, or the amount was not positive
    Ignored,
    Damaged { remaining: f64 },
    Defeated(BossDefeated),
}

#[derive(Debug, Clone, Serialize)]
pub struct BossEncounter {
    dungeon_id: String,
    level: u32,
    max_hp: f64,
    current_hp: f64,
    phase: BossPhase,
    hits_taken: u32,
}

impl BossEncounter {
    pub fn spawn(def: &DungeonDef, level: u32, config: &BossConfig) -> Self {
        let level = level.max(1);
        let max_hp = def.boss_hp(level, config.hp_scaling);
        tracing::debug!(target: "idle_core::boss", dungeon = %def.id, level, max_hp, "Boss spawning");
        Self {
            dungeon_id: def.id.clone(),
            level,
            max_hp,
            current_hp: max_hp,
            phase: BossPhase::Spawning,
            hits_taken: 0,
        }
    }

    /// Spawn animation finished; start accepting damage
    pub fn activate(&mut self) -> bool {
        if self.phase == BossPhase::Spawning {
            self.phase = BossPhase::Active;
            true
        } else {
            false
        }
    }

    pub fn dungeon_id(&self) -> &str {
        &self.dungeon_id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn current_hp(&self) -> f64 {
        self.current_hp
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp > 0.0 {
            (self.current_hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Apply one hit. On the killing blow the dungeon level is advanced, the
    /// reward credited and a save requested, in that order.
    pub fn apply_damage(&mut self, amount: f64, economy: &mut Economy, issuer: &RewardIssuer) -> DamageOutcome {
        if self.phase != BossPhase::Active {
            tracing::debug!(target: "idle_core::boss", phase = ?self.phase, amount, "Damage ignored outside active phase");
            return DamageOutcome::Ignored;
        }
        if !amount.is_finite() || amount <= 0.0 {
            tracing::debug!(target: "idle_core::boss", amount, "Ignoring non-positive damage");
            return DamageOutcome::Ignored;
        }

        self.hits_taken += 1;
        self.current_hp = (self.current_hp - amount).max(0.0);
        if self.current_hp > 0.0 {
            return DamageOutcome::Damaged {
                remaining: self.current_hp,
            };
        }

        self.phase = BossPhase::Defeated;
        let new_level = economy.increment_dungeon_level(&self.dungeon_id);
        let reward = issuer.give_reward(economy, &self.dungeon_id, self.level);
        economy.request_save();
        tracing::info!(
            target: "idle_core::boss",
            dungeon = %self.dungeon_id,
            level = self.level,
            new_level,
            hits = self.hits_taken,
            "Boss defeated"
        );
        DamageOutcome::Defeated(BossDefeated {
            dungeon_id: self.dungeon_id.clone(),
            dungeon_level: self.level,
            new_level,
            reward,
            hits_taken: self.hits_taken,
        })
    }
}
