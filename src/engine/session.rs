use std::sync::Arc;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::boss::{BossEncounter, BossPhase, DamageOutcome};
use crate::combat::{self, HitResult};
use crate::dungeon::DungeonCatalog;
use crate::economy::{Economy, PlayerState, UpgradeTrack};
use crate::engine::autofire::AutoFireTimer;
use crate::engine::config::EngineConfig;
use crate::error::{EngineError, PersistenceError};
use crate::events::{GameEvent, StatsSnapshot};
use crate::persistence::SaveStore;
use crate::rewards::RewardIssuer;

/// Result of one resolved hit against the current boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    pub hit: HitResult,
    pub remaining_hp: f64,
    pub defeated: bool,
    /// Coins credited for the HP this hit removed
    pub coins_earned: f64,
}

/// Read-only view of the encounter for hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterView {
    pub dungeon_id: String,
    pub level: u32,
    pub max_hp: f64,
    pub current_hp: f64,
    pub phase: BossPhase,
    pub hits_taken: u32,
}

impl From<&BossEncounter> for EncounterView {
    fn from(boss: &BossEncounter) -> Self {
        Self {
            dungeon_id: boss.dungeon_id().to_string(),
            level: boss.level(),
            max_hp: boss.max_hp(),
            current_hp: boss.current_hp(),
            phase: boss.phase(),
            hits_taken: boss.hits_taken(),
        }
    }
}

/// Full session state serialized for the bridge
#[derive(Debug, Clone, Serialize)]
pub struct SessionState<'a> {
    pub player: &'a PlayerState,
    pub stats: StatsSnapshot,
    pub encounter: Option<EncounterView>,
    pub save_pending: bool,
}

/// One player's game session: economy, encounter, RNG and timers.
///
/// Everything is driven from `tick` and the direct calls; nothing runs on
/// its own thread.
pub struct IdleEngine {
    pub config: EngineConfig,
    economy: Economy,
    catalog: Arc<DungeonCatalog>,
    issuer: RewardIssuer,
    encounter: Option<BossEncounter>,
    rng: Xoshiro256PlusPlus,
    auto_fire: AutoFireTimer,
    events: Vec<GameEvent>,
    elapsed_seconds: f64,
}

impl IdleEngine {
    pub fn new(config: EngineConfig, catalog: Arc<DungeonCatalog>, store: Box<dyn SaveStore>) -> Self {
        let economy = Economy::load(&config, store);
        tracing::info!(
            target: "idle_core::engine",
            dungeons = catalog.len(),
            seed = config.rng_seed,
            coins = economy.coins(),
            "Idle engine started"
        );
        Self {
            issuer: RewardIssuer::new(catalog.clone(), config.boss.reward_scaling),
            rng: Xoshiro256PlusPlus::seed_from_u64(config.rng_seed),
            catalog,
            economy,
            encounter: None,
            auto_fire: AutoFireTimer::new(),
            events: Vec::new(),
            elapsed_seconds: 0.0,
            config,
        }
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.economy
    }

    pub fn catalog(&self) -> &DungeonCatalog {
        &self.catalog
    }

    pub fn encounter(&self) -> Option<&BossEncounter> {
        self.encounter.as_ref()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn total_auto_shots(&self) -> u64 {
        self.auto_fire.total_shots()
    }

    // ========================
    // Economy delegation
    // ========================

    pub fn add_currency(&mut self, amount: f64) -> bool {
        self.economy.add_currency(amount).is_ok()
    }

    pub fn try_spend(&mut self, amount: f64) -> bool {
        self.economy.try_spend(amount)
    }

    pub fn upgrade(&mut self, track: UpgradeTrack) -> bool {
        self.economy.upgrade(track)
    }

    pub fn upgrade_cost(&self, track: UpgradeTrack, level: u32) -> f64 {
        self.economy.upgrade_cost(track, level)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.economy.snapshot()
    }

    pub fn state(&self) -> SessionState<'_> {
        SessionState {
            player: self.economy.state(),
            stats: self.economy.snapshot(),
            encounter: self.encounter.as_ref().map(EncounterView::from),
            save_pending: self.economy.is_save_pending(),
        }
    }

    // ========================
    // Encounters
    // ========================

    /// Start a fight against the boss of `dungeon_id` at the player's current level
    pub fn spawn_boss(&mut self, dungeon_id: &str) -> Result<&BossEncounter, EngineError> {
        let def = self
            .catalog
            .get(dungeon_id)
            .ok_or_else(|| EngineError::UnknownDungeon(dungeon_id.to_string()))?;
        let level = self.economy.dungeon_level(dungeon_id);
        let mut boss = BossEncounter::spawn(def, level, &self.config.boss);
        boss.activate();
        self.events.push(GameEvent::BossSpawned {
            dungeon_id: dungeon_id.to_string(),
            dungeon_level: level,
            max_hp: boss.max_hp(),
        });
        Ok(&*self.encounter.insert(boss))
    }

    /// Roll a hit with the player's damage and crit profile and apply it
    pub fn hit_boss(&mut self) -> Option<HitOutcome> {
        let active = self
            .encounter
            .as_ref()
            .is_some_and(|b| b.phase() == BossPhase::Active);
        if !active {
            return None;
        }
        let profile = self.economy.crit_profile();
        let hit = combat::resolve_with_profile(&mut self.rng, self.economy.derived_damage(), &profile);
        self.apply_hit(hit)
    }

    /// Apply damage computed by the host (no crit roll)
    pub fn apply_damage(&mut self, amount: f64) -> Option<HitOutcome> {
        self.apply_hit(HitResult {
            damage: amount,
            is_crit: false,
            is_super_crit: false,
        })
    }

    fn apply_hit(&mut self, hit: HitResult) -> Option<HitOutcome> {
        let boss = self.encounter.as_mut()?;
        let hp_before = boss.current_hp();
        let outcome = boss.apply_damage(hit.damage, &mut self.economy, &self.issuer);
        let (remaining_hp, defeated) = match &outcome {
            DamageOutcome::Ignored => return None,
            DamageOutcome::Damaged { remaining } => (*remaining, false),
            DamageOutcome::Defeated(_) => (0.0, true),
        };
        // overkill pays nothing
        let coins_earned = self.economy.earn_from_damage(hp_before - remaining_hp);
        self.events.push(GameEvent::BossDamaged {
            dungeon_id: boss.dungeon_id().to_string(),
            damage: hit.damage,
            remaining_hp,
            max_hp: boss.max_hp(),
            is_crit: hit.is_crit,
            is_super_crit: hit.is_super_crit,
        });
        if let DamageOutcome::Defeated(event) = outcome {
            self.events.push(GameEvent::BossDefeated(event));
        }
        Some(HitOutcome {
            hit,
            remaining_hp,
            defeated,
            coins_earned,
        })
    }

    /// Drop the encounter (defeat animation done, or player left)
    pub fn clear_encounter(&mut self) -> Option<BossEncounter> {
        self.encounter.take()
    }

    // ========================
    // Loop
    // ========================

    /// Advance timers; returns the number of auto-fire shots due this tick.
    /// The host decides whether each shot connects.
    pub fn tick(&mut self, delta_seconds: f32) -> u32 {
        if !(delta_seconds.is_finite() && delta_seconds >= 0.0) {
            tracing::warn!(target: "idle_core::engine", delta_seconds, "Ignoring invalid tick delta");
            return 0;
        }
        self.elapsed_seconds += delta_seconds as f64;
        let shots = self.auto_fire.advance(delta_seconds, self.economy.auto_fire_rate());
        self.economy.tick(delta_seconds);
        shots
    }

    /// Queued engine events followed by the economy's, in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.events);
        events.extend(self.economy.drain_events());
        events
    }

    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        self.economy.flush()
    }

    /// Write any pending save. Call before dropping the session.
    pub fn shutdown(&mut self) -> Result<(), PersistenceError> {
        tracing::info!(target: "idle_core::engine", elapsed = self.elapsed_seconds, "Idle engine shutting down");
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{self, MemoryStore};

    fn test_engine() -> (IdleEngine, MemoryStore) {
        let store = MemoryStore::new();
        let engine = IdleEngine::new(
            EngineConfig::default(),
            Arc::new(DungeonCatalog::builtin()),
            Box::new(store.clone()),
        );
        (engine, store)
    }

    #[test]
    fn test_engine_starts_fresh() {
        let (engine, _) = test_engine();
        assert_eq!(engine.economy().coins(), 0.0);
        assert!(engine.encounter().is_none());
        assert_eq!(engine.config.rng_seed, 42);
    }

    #[test]
    fn test_spawn_unknown_dungeon() {
        let (mut engine, _) = test_engine();
        assert!(matches!(
            engine.spawn_boss("nowhere"),
            Err(EngineError::UnknownDungeon(_))
        ));
    }

    #[test]
    fn test_spawn_uses_player_level() {
        let (mut engine, _) = test_engine();
        engine.economy_mut().increment_dungeon_level("goblin_cave");
        let boss = engine.spawn_boss("goblin_cave").unwrap();
        assert_eq!(boss.level(), 2);
        assert_eq!(boss.max_hp(), 150.0);
        assert_eq!(boss.phase(), BossPhase::Active);
    }

    #[test]
    fn test_hit_without_encounter() {
        let (mut engine, _) = test_engine();
        assert!(engine.hit_boss().is_none());
        assert!(engine.apply_damage(10.0).is_none());
    }

    #[test]
    fn test_kill_boss_with_external_damage() {
        let (mut engine, _) = test_engine();
        engine.spawn_boss("goblin_cave").unwrap();
        let first = engine.apply_damage(60.0).unwrap();
        assert_eq!(first.remaining_hp, 40.0);
        assert!(!first.defeated);
        let second = engine.apply_damage(60.0).unwrap();
        assert!(second.defeated);
        assert!(engine.apply_damage(60.0).is_none());
        assert_eq!(engine.economy().dungeon_level("goblin_cave"), 2);

        let events = engine.drain_events();
        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["BossSpawned", "BossDamaged", "BossDamaged", "BossDefeated", "StatsChanged"]
        );
    }

    #[test]
    fn test_hit_boss_uses_derived_damage() {
        let (mut engine, _) = test_engine();
        engine.spawn_boss("goblin_cave").unwrap();
        let outcome = engine.hit_boss().unwrap();
        assert!(outcome.hit.damage >= 1.0);
        assert!(outcome.remaining_hp < 100.0);
    }

    #[test]
    fn test_hits_earn_coins_for_hp_removed() {
        let (mut engine, _) = test_engine();
        engine.spawn_boss("goblin_cave").unwrap();
        let outcome = engine.hit_boss().unwrap();
        assert!(outcome.coins_earned > 0.0);
        assert_eq!(engine.economy().coins(), outcome.coins_earned);
        assert_eq!(outcome.coins_earned, 100.0 - outcome.remaining_hp);

        let first = engine.apply_damage(30.0).unwrap();
        assert_eq!(first.coins_earned, 30.0);
    }

    #[test]
    fn test_overkill_and_stale_hits_pay_nothing_extra() {
        let (mut engine, _) = test_engine();
        engine.spawn_boss("goblin_cave").unwrap();
        let kill = engine.apply_damage(1_000.0).unwrap();
        assert!(kill.defeated);
        assert_eq!(kill.coins_earned, 100.0);
        // 100 HP removed plus the level 1 reward of 25
        assert_eq!(engine.economy().coins(), 125.0);

        assert!(engine.apply_damage(50.0).is_none());
        assert!(engine.hit_boss().is_none());
        assert_eq!(engine.economy().coins(), 125.0);
    }

    #[test]
    fn test_rejected_damage_earns_nothing() {
        let (mut engine, _) = test_engine();
        engine.spawn_boss("goblin_cave").unwrap();
        assert!(engine.apply_damage(f64::NAN).is_none());
        assert!(engine.apply_damage(-5.0).is_none());
        assert_eq!(engine.economy().coins(), 0.0);
    }

    #[test]
    fn test_coin_rate_follows_config() {
        let mut config = EngineConfig::default();
        config.economy.coins_per_damage = 0.5;
        let mut engine = IdleEngine::new(config, Arc::new(DungeonCatalog::builtin()), Box::new(MemoryStore::new()));
        engine.spawn_boss("goblin_cave").unwrap();
        assert_eq!(engine.apply_damage(40.0).unwrap().coins_earned, 20.0);
        assert_eq!(engine.economy().coins(), 20.0);
    }

    #[test]
    fn test_tick_reports_auto_fire_shots() {
        let (mut engine, _) = test_engine();
        assert_eq!(engine.tick(5.0), 0);
        engine.add_currency(50.0);
        assert!(engine.upgrade(UpgradeTrack::AutoFire));
        assert_eq!(engine.tick(3.0), 3);
    }

    #[test]
    fn test_shutdown_flushes() {
        let (mut engine, store) = test_engine();
        engine.add_currency(12.0);
        engine.shutdown().unwrap();
        assert_eq!(persistence::load_or_default(&store).coins, 12.0);
    }

    #[test]
    fn test_invalid_tick_ignored() {
        let (mut engine, _) = test_engine();
        assert_eq!(engine.tick(f32::NAN), 0);
        assert_eq!(engine.tick(-1.0), 0);
        assert_eq!(engine.elapsed(), 0.0);
    }
}
