//! Monte-Carlo balance checks for the damage and reward curves.
//!
//! Rolls millions of hits in parallel batches (rayon) for a given player
//! build and compares the observed damage against the analytical
//! expectation, then estimates how long a boss at a given level takes to
//! kill. Batch seeds are derived with SHA3 so runs are reproducible
//! regardless of thread scheduling.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::combat::{self, CritProfile};
use crate::dungeon::DungeonDef;
use crate::economy::{Economy, PlayerState};
use crate::engine::config::EngineConfig;
use crate::persistence::MemoryStore;
use crate::rewards::RewardIssuer;

/// Player build under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub click_level: u32,
    pub auto_fire_level: u32,
    pub gem_level: u32,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub batches: u32,
    pub hits_per_batch: u32,
    pub base_seed: u64,
    /// Manual clicks per second assumed for time-to-kill
    pub clicks_per_second: f64,
    pub build: BuildSpec,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            batches: 64,
            hits_per_batch: 10_000,
            base_seed: 42,
            clicks_per_second: 5.0,
            build: BuildSpec {
                click_level: 10,
                auto_fire_level: 3,
                gem_level: 1,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct BatchStats {
    hits: u64,
    crits: u64,
    super_crits: u64,
    total_damage: f64,
}

impl BatchStats {
    fn merge(mut self, other: Self) -> Self {
        self.hits += other.hits;
        self.crits += other.crits;
        self.super_crits += other.super_crits;
        self.total_damage += other.total_damage;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceGrade {
    /// Observed mean within 1% of expectation
    Exact,
    Close,
    Drifting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageReport {
    pub total_hits: u64,
    pub base_damage: f64,
    pub profile: CritProfile,
    pub crit_rate: f64,
    pub super_crit_rate: f64,
    pub observed_mean_damage: f64,
    pub expected_mean_damage: f64,
    /// |observed - expected| / expected
    pub relative_error: f64,
    pub grade: BalanceGrade,
}

/// One row of the per-level progression table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    pub level: u32,
    pub boss_hp: f64,
    pub gems: f64,
    pub coins: f64,
    pub coins_per_hp: f64,
    pub seconds_to_kill: f64,
}

/// Seed for batch `index`, independent of the number of threads
pub fn batch_seed(base_seed: u64, index: u32) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Derived damage and crit profile of a build under `config`
pub fn build_stats(build: &BuildSpec, config: &EngineConfig) -> (f64, CritProfile, f64) {
    let state = PlayerState {
        click_upgrade_level: build.click_level,
        auto_fire_level: build.auto_fire_level,
        gem_level: build.gem_level,
        ..Default::default()
    };
    let economy = Economy::new(state, config, Box::new(MemoryStore::new()));
    (economy.derived_damage(), economy.crit_profile(), economy.auto_fire_rate())
}

pub fn run_damage_simulation(sim: &SimConfig, config: &EngineConfig) -> DamageReport {
    let (base_damage, profile, _) = build_stats(&sim.build, config);

    let stats = (0..sim.batches)
        .into_par_iter()
        .map(|batch| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(batch_seed(sim.base_seed, batch));
            let mut stats = BatchStats::default();
            for _ in 0..sim.hits_per_batch {
                let hit = combat::resolve_with_profile(&mut rng, base_damage, &profile);
                stats.hits += 1;
                stats.crits += hit.is_crit as u64;
                stats.super_crits += hit.is_super_crit as u64;
                stats.total_damage += hit.damage;
            }
            stats
        })
        .collect::<Vec<_>>()
        .into_iter()
        // merged in batch order so float sums don't depend on work stealing
        .fold(BatchStats::default(), BatchStats::merge);

    let hits = stats.hits.max(1) as f64;
    let observed = stats.total_damage / hits;
    let expected = base_damage * profile.expected_multiplier();
    let relative_error = if expected > 0.0 {
        (observed - expected).abs() / expected
    } else {
        0.0
    };
    let grade = if relative_error < 0.01 {
        BalanceGrade::Exact
    } else if relative_error < 0.05 {
        BalanceGrade::Close
    } else {
        BalanceGrade::Drifting
    };

    let report = DamageReport {
        total_hits: stats.hits,
        base_damage,
        profile,
        crit_rate: stats.crits as f64 / hits,
        super_crit_rate: stats.super_crits as f64 / hits,
        observed_mean_damage: observed,
        expected_mean_damage: expected,
        relative_error,
        grade,
    };
    tracing::info!(
        target: "idle_core::balance",
        hits = report.total_hits,
        observed = report.observed_mean_damage,
        expected = report.expected_mean_damage,
        grade = ?report.grade,
        "Damage simulation finished"
    );
    report
}

/// Boss HP, rewards and expected time-to-kill for levels `1..=max_level`
pub fn level_table(
    def: &DungeonDef,
    issuer: &RewardIssuer,
    sim: &SimConfig,
    config: &EngineConfig,
    max_level: u32,
) -> Vec<LevelRow> {
    let (base_damage, profile, auto_rate) = build_stats(&sim.build, config);
    let dps = base_damage * profile.expected_multiplier() * (sim.clicks_per_second + auto_rate);
    (1..=max_level)
        .map(|level| {
            let boss_hp = def.boss_hp(level, config.boss.hp_scaling);
            let reward = issuer.compute_reward(&def.id, level);
            LevelRow {
                level,
                boss_hp,
                gems: reward.gems,
                coins: reward.coins,
                coins_per_hp: reward.coins / boss_hp,
                seconds_to_kill: if dps > 0.0 { boss_hp / dps } else { f64::INFINITY },
            }
        })
        .collect()
}
