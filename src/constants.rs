//! Centralized game constants for the idle progression core.
//!
//! These are the defaults baked into `EngineConfig::default()` and the
//! built-in dungeon catalog. Runtime code reads the config, not these
//! constants directly, so a loaded config can override every value.

// =====================================================
// Upgrade cost curves: cost = initial * multiplier^level
// =====================================================

pub const CLICK_INITIAL_COST: f64 = 10.0;
pub const CLICK_COST_MULTIPLIER: f64 = 1.5;

pub const AUTO_FIRE_INITIAL_COST: f64 = 50.0;
pub const AUTO_FIRE_COST_MULTIPLIER: f64 = 1.8;

/// Gem levels are paid in gems, not coins
pub const GEM_LEVEL_INITIAL_COST: f64 = 1.0;
pub const GEM_LEVEL_COST_MULTIPLIER: f64 = 3.0;

// =====================================================
// Damage & fire rate
// =====================================================

/// Click damage at click level 0
pub const BASE_CLICK_DAMAGE: f64 = 1.0;

/// Flat damage added per click upgrade level
pub const DAMAGE_PER_CLICK_LEVEL: f64 = 1.0;

/// Coins earned per point of boss HP removed
pub const COINS_PER_DAMAGE: f64 = 1.0;

/// Auto-fire shots per second gained per auto-fire level (level 0 = disabled)
pub const AUTO_FIRE_RATE_PER_LEVEL: f64 = 1.0;

// =====================================================
// Gem-derived bonuses: increment * 3^(gem_level - 1)
// =====================================================

pub const GEM_BONUS_GROWTH: f64 = 3.0;
pub const GEM_ATTACK_FLAT_INCREMENT: f64 = 100.0;
pub const GEM_ATTACK_PERCENT_INCREMENT: f64 = 0.05;
pub const GEM_CRIT_DAMAGE_INCREMENT: f64 = 0.1;

// =====================================================
// Critical hits
// =====================================================

/// Base critical hit chance (10%)
pub const BASE_CRIT_CHANCE: f64 = 0.10;

/// Critical damage multiplier (2x)
pub const CRIT_DAMAGE_MULT: f64 = 2.0;

/// Super-critical chance (2%), rolled independently of the crit roll
pub const BASE_SUPER_CRIT_CHANCE: f64 = 0.02;

/// Super-critical multiplier, applied on top of the crit multiplier
pub const SUPER_CRIT_DAMAGE_MULT: f64 = 3.0;

// =====================================================
// Bosses & rewards
// =====================================================

/// Boss HP growth per dungeon level: max_hp = base * 1.5^(level - 1)
pub const BOSS_HP_SCALING: f64 = 1.5;

/// Rewards grow with the same factor as boss HP
pub const REWARD_SCALING: f64 = 1.5;

/// Level assumed for a dungeon with no recorded progress
pub const DEFAULT_DUNGEON_LEVEL: u32 = 1;

// =====================================================
// Persistence
// =====================================================

/// Quiet period after the last mutation before a save is written
pub const SAVE_DEBOUNCE_SECS: f32 = 1.0;

/// Upper bound on how long a pending save can be deferred by a stream of mutations
pub const SAVE_MAX_DEFERRAL_SECS: f32 = 10.0;

/// Default save file location, relative to the working directory
pub const DEFAULT_SAVE_PATH: &str = "saves/player.json";
