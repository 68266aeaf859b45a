use serde::{Deserialize, Serialize};

use super::curve::level_pow;
use crate::engine::config::GemBonusConfig;

/// Stat bonuses derived from the gem level. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatBonus {
    /// Added to base click damage
    pub attack_flat: f64,
    /// Fractional damage bonus (0.05 = +5%)
    pub attack_percent: f64,
    /// Added to the crit multiplier
    pub crit_damage: f64,
}

impl StatBonus {
    pub fn for_gem_level(gem_level: u32, config: &GemBonusConfig) -> Self {
        Self {
            attack_flat: gem_scaled(config.attack_flat_increment, gem_level, config.growth),
            attack_percent: gem_scaled(config.attack_percent_increment, gem_level, config.growth),
            crit_damage: gem_scaled(config.crit_damage_increment, gem_level, config.growth),
        }
    }
}

/// `increment * growth^(gem_level - 1)`, zero below level 1
pub fn gem_scaled(increment: f64, gem_level: u32, growth: f64) -> f64 {
    if gem_level == 0 {
        return 0.0;
    }
    increment * level_pow(growth, gem_level - 1)
}
