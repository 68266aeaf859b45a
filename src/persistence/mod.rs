//! Persistence adapter: durable stores, the versioned save codec glue, and
//! the debounce policy that coalesces bursts of mutations into one write.

mod debounce;
mod store;

pub use debounce::SaveScheduler;
pub use store::{FileStore, MemoryStore, SaveStore};

use crate::economy::PlayerState;
use crate::error::PersistenceError;
use crate::savemigration;

/// Load the player state, falling back to the zero state on any failure.
///
/// A missing record is the normal first-run case and is not logged as a
/// problem; unreadable or corrupt records are.
pub fn load_or_default(store: &dyn SaveStore) -> PlayerState {
    match try_load(store) {
        Ok(Some(state)) => {
            tracing::info!(target: "idle_core::persistence", store = %store.describe(), "Loaded player state");
            state
        }
        Ok(None) => {
            tracing::info!(target: "idle_core::persistence", store = %store.describe(), "No save found, starting fresh");
            PlayerState::default()
        }
        Err(e) => {
            tracing::warn!(target: "idle_core::persistence", store = %store.describe(), error = %e, "Save unreadable, starting from default state");
            PlayerState::default()
        }
    }
}

pub fn try_load(store: &dyn SaveStore) -> Result<Option<PlayerState>, PersistenceError> {
    match store.load()? {
        Some(text) => savemigration::decode_save(&text).map(Some),
        None => Ok(None),
    }
}

pub fn save(store: &mut dyn SaveStore, state: &PlayerState) -> Result<(), PersistenceError> {
    let payload = savemigration::encode_save(state)?;
    store.save(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_or_default(&store), PlayerState::default());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut store = MemoryStore::new();
        let mut state = PlayerState {
            coins: 123.25,
            gems: 7.0,
            click_upgrade_level: 4,
            auto_fire_level: 2,
            gem_level: 1,
            ..Default::default()
        };
        state.dungeon_progress.insert("goblin_cave".into(), 3);
        save(&mut store, &state).unwrap();
        assert_eq!(load_or_default(&store), state);
    }

    #[test]
    fn test_corrupt_record_falls_back() {
        let store = MemoryStore::with_record("{{{ definitely not json");
        assert_eq!(load_or_default(&store), PlayerState::default());
        assert!(try_load(&store).is_err());
    }
}
