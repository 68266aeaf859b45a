//! Idle Dungeon - Progression Core Library
//!
//! Deterministic game logic for an idle clicker with dungeon bosses:
//! - Currency & stats core (coins, gems, upgrade tracks, derived stats)
//! - Upgrade cost curves and gem-level stat bonuses
//! - Crit / super-crit hit resolution and circle hit detection
//! - Boss encounter state machine with per-dungeon level progression
//! - Level-scaled rewards
//! - Debounced, versioned, checksummed persistence
//! - Bevy plugin and C ABI bridge for hosts

pub mod balance;
pub mod boss;
pub mod bridge;
pub mod combat;
pub mod constants;
pub mod dungeon;
pub mod economy;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod persistence;
pub mod rewards;
pub mod savemigration;
