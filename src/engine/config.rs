use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::economy::UpgradeCostCurve;
use crate::error::ConfigError;

/// Top-level session configuration. Loaded from RON or JSON; every section
/// falls back to the built-in defaults when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub economy: EconomyConfig,
    pub combat: CombatConfig,
    pub boss: BossConfig,
    pub persistence: PersistenceConfig,
    /// Seed for the combat RNG (crit rolls)
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            economy: EconomyConfig::default(),
            combat: CombatConfig::default(),
            boss: BossConfig::default(),
            persistence: PersistenceConfig::default(),
            rng_seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub click_curve: UpgradeCostCurve,
    pub auto_fire_curve: UpgradeCostCurve,
    pub gem_curve: UpgradeCostCurve,
    pub base_click_damage: f64,
    pub damage_per_click_level: f64,
    pub auto_fire_rate_per_level: f64,
    pub coins_per_damage: f64,
    pub gem_bonus: GemBonusConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            click_curve: UpgradeCostCurve::new(CLICK_INITIAL_COST, CLICK_COST_MULTIPLIER),
            auto_fire_curve: UpgradeCostCurve::new(AUTO_FIRE_INITIAL_COST, AUTO_FIRE_COST_MULTIPLIER),
            gem_curve: UpgradeCostCurve::new(GEM_LEVEL_INITIAL_COST, GEM_LEVEL_COST_MULTIPLIER),
            base_click_damage: BASE_CLICK_DAMAGE,
            damage_per_click_level: DAMAGE_PER_CLICK_LEVEL,
            auto_fire_rate_per_level: AUTO_FIRE_RATE_PER_LEVEL,
            coins_per_damage: COINS_PER_DAMAGE,
            gem_bonus: GemBonusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemBonusConfig {
    pub growth: f64,
    pub attack_flat_increment: f64,
    pub attack_percent_increment: f64,
    pub crit_damage_increment: f64,
}

impl Default for GemBonusConfig {
    fn default() -> Self {
        Self {
            growth: GEM_BONUS_GROWTH,
            attack_flat_increment: GEM_ATTACK_FLAT_INCREMENT,
            attack_percent_increment: GEM_ATTACK_PERCENT_INCREMENT,
            crit_damage_increment: GEM_CRIT_DAMAGE_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub super_crit_chance: f64,
    pub super_crit_multiplier: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            crit_chance: BASE_CRIT_CHANCE,
            crit_multiplier: CRIT_DAMAGE_MULT,
            super_crit_chance: BASE_SUPER_CRIT_CHANCE,
            super_crit_multiplier: SUPER_CRIT_DAMAGE_MULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub hp_scaling: f64,
    pub reward_scaling: f64,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            hp_scaling: BOSS_HP_SCALING,
            reward_scaling: REWARD_SCALING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub save_path: PathBuf,
    pub debounce_secs: f32,
    pub max_deferral_secs: f32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            debounce_secs: SAVE_DEBOUNCE_SECS,
            max_deferral_secs: SAVE_MAX_DEFERRAL_SECS,
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `.ron` or `.json`, picked by extension (RON otherwise)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }

    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Collect every problem rather than stopping at the first
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        for (name, curve) in [
            ("click_curve", &self.economy.click_curve),
            ("auto_fire_curve", &self.economy.auto_fire_curve),
            ("gem_curve", &self.economy.gem_curve),
        ] {
            if let Err(e) = curve.validate() {
                issues.push(format!("economy.{name}: {e}"));
            }
        }
        if !(self.economy.base_click_damage >= 0.0 && self.economy.base_click_damage.is_finite()) {
            issues.push("economy.base_click_damage must be >= 0".to_string());
        }
        if !(self.economy.damage_per_click_level > 0.0 && self.economy.damage_per_click_level.is_finite()) {
            issues.push("economy.damage_per_click_level must be > 0".to_string());
        }
        if !(self.economy.auto_fire_rate_per_level >= 0.0 && self.economy.auto_fire_rate_per_level.is_finite()) {
            issues.push("economy.auto_fire_rate_per_level must be >= 0".to_string());
        }
        if !(self.economy.coins_per_damage >= 0.0 && self.economy.coins_per_damage.is_finite()) {
            issues.push("economy.coins_per_damage must be >= 0".to_string());
        }
        if !(self.economy.gem_bonus.growth >= 1.0) {
            issues.push("economy.gem_bonus.growth must be >= 1".to_string());
        }

        for (name, chance) in [
            ("crit_chance", self.combat.crit_chance),
            ("super_crit_chance", self.combat.super_crit_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                issues.push(format!("combat.{name} must be within [0, 1], got {chance}"));
            }
        }
        for (name, mult) in [
            ("crit_multiplier", self.combat.crit_multiplier),
            ("super_crit_multiplier", self.combat.super_crit_multiplier),
        ] {
            if !(mult >= 1.0 && mult.is_finite()) {
                issues.push(format!("combat.{name} must be >= 1, got {mult}"));
            }
        }

        if !(self.boss.hp_scaling >= 1.0 && self.boss.hp_scaling.is_finite()) {
            issues.push("boss.hp_scaling must be >= 1".to_string());
        }
        if !(self.boss.reward_scaling >= 1.0 && self.boss.reward_scaling.is_finite()) {
            issues.push("boss.reward_scaling must be >= 1".to_string());
        }

        if !(self.persistence.debounce_secs >= 0.0) {
            issues.push("persistence.debounce_secs must be >= 0".to_string());
        }
        if self.persistence.max_deferral_secs < self.persistence.debounce_secs {
            issues.push("persistence.max_deferral_secs must be >= debounce_secs".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}
