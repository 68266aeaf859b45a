//! Engine session layer.
//!
//! `IdleEngine` is the explicitly owned session object that ties the economy,
//! dungeon catalog, reward issuer, boss encounter and timers together. Hosts
//! drive it either directly (`tick`, `hit_boss`, ...), through the C bridge,
//! or inside Bevy via `IdleEnginePlugin`.

pub mod autofire;
pub mod config;
pub mod plugin;
pub mod session;

pub use autofire::AutoFireTimer;
pub use config::{BossConfig, CombatConfig, EconomyConfig, EngineConfig, GemBonusConfig, PersistenceConfig};
pub use plugin::{
    AutoFireShot, BossHitRequest, EngineNotification, EngineResource, IdleEnginePlugin, SpawnBossRequest,
    UpgradeRequest,
};
pub use session::{EncounterView, HitOutcome, IdleEngine, SessionState};
