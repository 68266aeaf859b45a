//! Currency & stats core.
//!
//! `Economy` owns the canonical `PlayerState` for a session together with the
//! arithmetic for every derived value (costs, damage, fire rate, crit) and the
//! debounced persistence of that state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::CritProfile;
use crate::engine::config::{CombatConfig, EconomyConfig, EngineConfig};
use crate::error::{EconomyError, PersistenceError};
use crate::events::{GameEvent, StatsSnapshot};
use crate::persistence::{self, SaveScheduler, SaveStore};

mod bonus;
mod curve;
mod state;

pub use bonus::{gem_scaled, StatBonus};
pub use curve::{level_pow, UpgradeCostCurve};
pub use state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Coins,
    Gems,
}

/// Independently leveled progression axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeTrack {
    ClickPower,
    AutoFire,
    GemLevel,
}

impl UpgradeTrack {
    pub const ALL: [UpgradeTrack; 3] = [Self::ClickPower, Self::AutoFire, Self::GemLevel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClickPower => "click",
            Self::AutoFire => "autofire",
            Self::GemLevel => "gem",
        }
    }

    /// Currency this track is bought with
    pub fn currency(&self) -> Currency {
        match self {
            Self::ClickPower | Self::AutoFire => Currency::Coins,
            Self::GemLevel => Currency::Gems,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::ClickPower),
            1 => Some(Self::AutoFire),
            2 => Some(Self::GemLevel),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeTrack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "click" | "clickpower" | "click_power" => Ok(Self::ClickPower),
            "autofire" | "auto_fire" | "auto-fire" => Ok(Self::AutoFire),
            "gem" | "gemlevel" | "gem_level" => Ok(Self::GemLevel),
            other => Err(format!("unknown upgrade track '{other}'")),
        }
    }
}

pub struct Economy {
    state: PlayerState,
    config: EconomyConfig,
    combat: CombatConfig,
    scheduler: SaveScheduler,
    store: Box<dyn SaveStore>,
    outbox: Vec<GameEvent>,
    stats_dirty: bool,
}

impl fmt::Debug for Economy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Economy")
            .field("state", &self.state)
            .field("store", &self.store.describe())
            .field("save_pending", &self.scheduler.is_pending())
            .finish()
    }
}

impl Economy {
    pub fn new(state: PlayerState, config: &EngineConfig, store: Box<dyn SaveStore>) -> Self {
        Self {
            state: state.sanitized(),
            config: config.economy.clone(),
            combat: config.combat.clone(),
            scheduler: SaveScheduler::new(
                config.persistence.debounce_secs,
                config.persistence.max_deferral_secs,
            ),
            store,
            outbox: Vec::new(),
            stats_dirty: false,
        }
    }

    /// Construct from whatever the store holds; unreadable saves start fresh
    pub fn load(config: &EngineConfig, store: Box<dyn SaveStore>) -> Self {
        let state = persistence::load_or_default(store.as_ref());
        Self::new(state, config, store)
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn coins(&self) -> f64 {
        self.state.coins
    }

    pub fn gems(&self) -> f64 {
        self.state.gems
    }

    pub fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Coins => self.state.coins,
            Currency::Gems => self.state.gems,
        }
    }

    pub fn level(&self, track: UpgradeTrack) -> u32 {
        match track {
            UpgradeTrack::ClickPower => self.state.click_upgrade_level,
            UpgradeTrack::AutoFire => self.state.auto_fire_level,
            UpgradeTrack::GemLevel => self.state.gem_level,
        }
    }

    // ========================
    // Currency
    // ========================

    pub fn add_currency(&mut self, amount: f64) -> Result<(), EconomyError> {
        self.credit(Currency::Coins, amount)
    }

    pub fn add_gems(&mut self, amount: f64) -> Result<(), EconomyError> {
        self.credit(Currency::Gems, amount)
    }

    pub fn credit(&mut self, currency: Currency, amount: f64) -> Result<(), EconomyError> {
        if !amount.is_finite() || amount < 0.0 {
            tracing::warn!(target: "idle_core::economy", ?currency, amount, "Rejected invalid credit");
            return Err(EconomyError::InvalidAmount(amount));
        }
        if amount == 0.0 {
            return Ok(());
        }
        let balance = self.balance_mut(currency);
        let updated = *balance + amount;
        if !updated.is_finite() {
            tracing::warn!(target: "idle_core::economy", ?currency, amount, "Rejected credit that would overflow");
            return Err(EconomyError::InvalidAmount(amount));
        }
        *balance = updated;
        self.touch();
        Ok(())
    }

    /// Pay out coins for `dealt` points of boss HP removed. Returns the
    /// amount credited; a rejected payout credits nothing.
    pub fn earn_from_damage(&mut self, dealt: f64) -> f64 {
        let earned = dealt * self.config.coins_per_damage;
        match self.add_currency(earned) {
            Ok(()) => earned,
            Err(_) => 0.0,
        }
    }

    /// Typed spend: the balance is untouched on any error
    pub fn spend(&mut self, currency: Currency, amount: f64) -> Result<(), EconomyError> {
        if !amount.is_finite() || amount < 0.0 {
            tracing::warn!(target: "idle_core::economy", ?currency, amount, "Rejected invalid spend");
            return Err(EconomyError::InvalidAmount(amount));
        }
        let have = self.balance(currency);
        if have < amount {
            return Err(EconomyError::InsufficientFunds {
                currency,
                have,
                need: amount,
            });
        }
        *self.balance_mut(currency) = have - amount;
        self.touch();
        Ok(())
    }

    pub fn try_spend(&mut self, amount: f64) -> bool {
        self.spend(Currency::Coins, amount).is_ok()
    }

    pub fn try_spend_gems(&mut self, amount: f64) -> bool {
        self.spend(Currency::Gems, amount).is_ok()
    }

    fn balance_mut(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Coins => &mut self.state.coins,
            Currency::Gems => &mut self.state.gems,
        }
    }

    // ========================
    // Upgrades
    // ========================

    pub fn curve(&self, track: UpgradeTrack) -> &UpgradeCostCurve {
        match track {
            UpgradeTrack::ClickPower => &self.config.click_curve,
            UpgradeTrack::AutoFire => &self.config.auto_fire_curve,
            UpgradeTrack::GemLevel => &self.config.gem_curve,
        }
    }

    pub fn upgrade_cost(&self, track: UpgradeTrack, level: u32) -> f64 {
        self.curve(track).cost(level)
    }

    pub fn next_upgrade_cost(&self, track: UpgradeTrack) -> f64 {
        self.upgrade_cost(track, self.level(track))
    }

    /// Buy one level; returns the new level
    pub fn try_upgrade(&mut self, track: UpgradeTrack) -> Result<u32, EconomyError> {
        let cost = self.next_upgrade_cost(track);
        self.spend(track.currency(), cost)?;
        let level = match track {
            UpgradeTrack::ClickPower => &mut self.state.click_upgrade_level,
            UpgradeTrack::AutoFire => &mut self.state.auto_fire_level,
            UpgradeTrack::GemLevel => &mut self.state.gem_level,
        };
        *level += 1;
        let new_level = *level;
        tracing::debug!(target: "idle_core::economy", %track, cost, new_level, "Upgrade purchased");
        Ok(new_level)
    }

    pub fn upgrade(&mut self, track: UpgradeTrack) -> bool {
        match self.try_upgrade(track) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(target: "idle_core::economy", %track, error = %e, "Upgrade refused");
                false
            }
        }
    }

    // ========================
    // Derived stats
    // ========================

    pub fn stat_bonus(&self) -> StatBonus {
        StatBonus::for_gem_level(self.state.gem_level, &self.config.gem_bonus)
    }

    /// Click damage including gem bonuses: (base + levels + flat) * (1 + percent)
    pub fn derived_damage(&self) -> f64 {
        let bonus = self.stat_bonus();
        let base = self.config.base_click_damage
            + self.state.click_upgrade_level as f64 * self.config.damage_per_click_level;
        ((base + bonus.attack_flat) * (1.0 + bonus.attack_percent)).min(f64::MAX)
    }

    /// Shots per second; 0 means auto-fire is disabled
    pub fn auto_fire_rate(&self) -> f64 {
        self.state.auto_fire_level as f64 * self.config.auto_fire_rate_per_level
    }

    pub fn auto_fire_interval_ms(&self) -> Option<f64> {
        let rate = self.auto_fire_rate();
        if rate > 0.0 {
            Some(1000.0 / rate)
        } else {
            None
        }
    }

    pub fn crit_profile(&self) -> CritProfile {
        CritProfile {
            crit_chance: self.combat.crit_chance,
            crit_multiplier: (self.combat.crit_multiplier + self.stat_bonus().crit_damage).min(f64::MAX),
            super_crit_chance: self.combat.super_crit_chance,
            super_crit_multiplier: self.combat.super_crit_multiplier,
        }
        .normalized()
    }

    // ========================
    // Dungeon progress
    // ========================

    pub fn dungeon_level(&self, dungeon_id: &str) -> u32 {
        self.state.dungeon_level(dungeon_id)
    }

    /// Advance one level. Not idempotent: call exactly once per defeat.
    pub fn increment_dungeon_level(&mut self, dungeon_id: &str) -> u32 {
        let level = self
            .state
            .dungeon_progress
            .entry(dungeon_id.to_string())
            .or_insert(crate::constants::DEFAULT_DUNGEON_LEVEL);
        *level += 1;
        let new_level = *level;
        tracing::info!(target: "idle_core::economy", dungeon = dungeon_id, new_level, "Dungeon level advanced");
        self.touch();
        new_level
    }

    // ========================
    // Persistence
    // ========================

    /// Every state mutation marks stats for refresh and queues a save
    fn touch(&mut self) {
        self.stats_dirty = true;
        self.scheduler.mark_dirty();
    }

    pub fn request_save(&mut self) {
        self.scheduler.mark_dirty();
    }

    pub fn is_save_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn save_writes(&self) -> u64 {
        self.scheduler.writes()
    }

    pub fn save_failures(&self) -> u64 {
        self.scheduler.failures()
    }

    /// Advance the debounce clocks and write if due. Failures are logged,
    /// reported as `SaveFailed`, and retried on the next cycle.
    pub fn tick(&mut self, dt_secs: f32) {
        if self.scheduler.advance(dt_secs) {
            if let Err(e) = self.write_now() {
                tracing::warn!(target: "idle_core::persistence", error = %e, "Debounced save failed, will retry");
                self.scheduler.fail();
                self.outbox.push(GameEvent::SaveFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Synchronously write a pending save (shutdown path)
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        if !self.scheduler.is_pending() {
            return Ok(());
        }
        self.write_now().inspect_err(|_| self.scheduler.fail())
    }

    fn write_now(&mut self) -> Result<(), PersistenceError> {
        let _span = tracing::debug_span!("save", store = %self.store.describe()).entered();
        persistence::save(self.store.as_mut(), &self.state)?;
        self.scheduler.complete();
        tracing::debug!(target: "idle_core::persistence", writes = self.scheduler.writes(), "Player state saved");
        Ok(())
    }

    // ========================
    // Notifications
    // ========================

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            coins: self.state.coins,
            gems: self.state.gems,
            click_upgrade_level: self.state.click_upgrade_level,
            auto_fire_level: self.state.auto_fire_level,
            gem_level: self.state.gem_level,
            damage: self.derived_damage(),
            auto_fire_rate: self.auto_fire_rate(),
            auto_fire_interval_ms: self.auto_fire_interval_ms(),
            next_click_cost: self.next_upgrade_cost(UpgradeTrack::ClickPower),
            next_auto_fire_cost: self.next_upgrade_cost(UpgradeTrack::AutoFire),
            next_gem_cost: self.next_upgrade_cost(UpgradeTrack::GemLevel),
            bonus: self.stat_bonus(),
            crit: self.crit_profile(),
        }
    }

    /// Queued events; stat changes since the last drain collapse into one
    /// trailing `StatsChanged`
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.outbox);
        if std::mem::take(&mut self.stats_dirty) {
            events.push(GameEvent::StatsChanged(self.snapshot()));
        }
        events
    }
}

impl Drop for Economy {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!(target: "idle_core::persistence", error = %e, "Final save on teardown failed");
        }
    }
}
