//! C ABI bridge for non-Rust hosts.
//!
//! A session is an opaque `IdleEngine` handle created by `idle_engine_create`
//! and released by `idle_engine_destroy` (which flushes the pending save).
//! Structured data crosses the boundary as JSON; every returned string is
//! heap-allocated by Rust and must be released with `free_string`.
//! Null handles or pointers never crash: they yield null, `false` or -1.

#![allow(improper_ctypes_definitions)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use serde::Serialize;

use crate::combat::hitbox::{circles_overlap, Circle};
use crate::dungeon::DungeonCatalog;
use crate::economy::{UpgradeTrack, UpgradeCostCurve};
use crate::engine::config::EngineConfig;
use crate::engine::session::{EncounterView, IdleEngine};
use crate::logging;
use crate::persistence::{FileStore, MemoryStore, SaveStore};
use crate::savemigration;

// ========================
// Helpers
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).map_or(std::ptr::null_mut(), CString::into_raw),
        Err(e) => {
            tracing::warn!(target: "idle_core::bridge", error = %e, "Failed to serialize response");
            std::ptr::null_mut()
        }
    }
}

fn parse_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned()) }
}

fn engine_mut<'a>(handle: *mut IdleEngine) -> Option<&'a mut IdleEngine> {
    if handle.is_null() {
        tracing::warn!(target: "idle_core::bridge", "Null engine handle");
        return None;
    }
    unsafe { handle.as_mut() }
}

/// Config from JSON, or the default when `config_json` is null
fn config_from_ptr(config_json: *const c_char) -> Option<EngineConfig> {
    match parse_cstr(config_json) {
        None => Some(EngineConfig::default()),
        Some(json) => match EngineConfig::from_json_str(&json) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(target: "idle_core::bridge", error = %e, "Rejected engine config");
                None
            }
        },
    }
}

fn catalog_from_ptr(catalog_ron: *const c_char) -> Option<DungeonCatalog> {
    match parse_cstr(catalog_ron) {
        None => Some(DungeonCatalog::builtin()),
        Some(text) => match DungeonCatalog::from_ron_str(&text) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!(target: "idle_core::bridge", error = %e, "Rejected dungeon catalog");
                None
            }
        },
    }
}

fn create_engine(config: EngineConfig, catalog: DungeonCatalog, store: Box<dyn SaveStore>) -> *mut IdleEngine {
    Box::into_raw(Box::new(IdleEngine::new(config, Arc::new(catalog), store)))
}

// ========================
// C-ABI: Core
// ========================

#[no_mangle]
pub extern "C" fn get_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION")).map_or(std::ptr::null_mut(), CString::into_raw)
}

/// Free a string allocated by Rust. `ptr` must come from this library or be null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Install the tracing subscriber. Null uses the default config.
#[no_mangle]
pub extern "C" fn idle_logging_init(config_json: *const c_char) -> bool {
    let config = match parse_cstr(config_json) {
        None => logging::TracingConfig::default(),
        Some(json) => match logging::TracingConfig::from_json(&json) {
            Some(config) => config,
            None => return false,
        },
    };
    logging::init_tracing(&config);
    true
}

// ========================
// C-ABI: Session lifecycle
// ========================

/// Create a session backed by a save file.
///
/// `config_json` (JSON `EngineConfig`) and `save_path` may be null; null
/// means defaults. Returns null if the config is invalid.
#[no_mangle]
pub extern "C" fn idle_engine_create(config_json: *const c_char, save_path: *const c_char) -> *mut IdleEngine {
    let Some(config) = config_from_ptr(config_json) else {
        return std::ptr::null_mut();
    };
    let path = parse_cstr(save_path)
        .map(Into::into)
        .unwrap_or_else(|| config.persistence.save_path.clone());
    create_engine(config, DungeonCatalog::builtin(), Box::new(FileStore::new(path)))
}

/// Like `idle_engine_create` but with a RON dungeon catalog (null = built-in)
#[no_mangle]
pub extern "C" fn idle_engine_create_with_catalog(
    config_json: *const c_char,
    catalog_ron: *const c_char,
    save_path: *const c_char,
) -> *mut IdleEngine {
    let (Some(config), Some(catalog)) = (config_from_ptr(config_json), catalog_from_ptr(catalog_ron)) else {
        return std::ptr::null_mut();
    };
    let path = parse_cstr(save_path)
        .map(Into::into)
        .unwrap_or_else(|| config.persistence.save_path.clone());
    create_engine(config, catalog, Box::new(FileStore::new(path)))
}

/// Session that never touches disk (tests, previews)
#[no_mangle]
pub extern "C" fn idle_engine_create_in_memory(config_json: *const c_char) -> *mut IdleEngine {
    let Some(config) = config_from_ptr(config_json) else {
        return std::ptr::null_mut();
    };
    create_engine(config, DungeonCatalog::builtin(), Box::new(MemoryStore::new()))
}

/// Flush and free a session. The handle is invalid afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn idle_engine_destroy(handle: *mut IdleEngine) {
    if handle.is_null() {
        return;
    }
    let mut engine = unsafe { Box::from_raw(handle) };
    if let Err(e) = engine.shutdown() {
        tracing::error!(target: "idle_core::bridge", error = %e, "Final save failed on destroy");
    }
}

#[no_mangle]
pub extern "C" fn idle_flush(handle: *mut IdleEngine) -> bool {
    engine_mut(handle).is_some_and(|engine| engine.flush().is_ok())
}

/// Advance the session; returns auto-fire shots due, -1 on a null handle
#[no_mangle]
pub extern "C" fn idle_tick(handle: *mut IdleEngine, delta_seconds: f32) -> i32 {
    match engine_mut(handle) {
        Some(engine) => engine.tick(delta_seconds).min(i32::MAX as u32) as i32,
        None => -1,
    }
}

/// Drain queued notifications as a JSON array
#[no_mangle]
pub extern "C" fn idle_poll_events(handle: *mut IdleEngine) -> *mut c_char {
    match engine_mut(handle) {
        Some(engine) => json_to_cstring(&engine.drain_events()),
        None => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn idle_get_state_json(handle: *mut IdleEngine) -> *mut c_char {
    match engine_mut(handle) {
        Some(engine) => json_to_cstring(&engine.state()),
        None => std::ptr::null_mut(),
    }
}

// ========================
// C-ABI: Economy
// ========================

#[no_mangle]
pub extern "C" fn idle_add_coins(handle: *mut IdleEngine, amount: f64) -> bool {
    engine_mut(handle).is_some_and(|engine| engine.add_currency(amount))
}

#[no_mangle]
pub extern "C" fn idle_try_spend(handle: *mut IdleEngine, amount: f64) -> bool {
    engine_mut(handle).is_some_and(|engine| engine.try_spend(amount))
}

/// Buy one level. Tracks: 0 = click, 1 = auto-fire, 2 = gem level.
#[no_mangle]
pub extern "C" fn idle_upgrade(handle: *mut IdleEngine, track: u32) -> bool {
    let Some(track) = UpgradeTrack::from_id(track) else {
        tracing::warn!(target: "idle_core::bridge", track, "Unknown upgrade track");
        return false;
    };
    engine_mut(handle).is_some_and(|engine| engine.upgrade(track))
}

/// Cost of `track` at `level` under the default curves; -1 for an unknown track
#[no_mangle]
pub extern "C" fn idle_get_upgrade_cost(track: u32, level: u32) -> f64 {
    let config = EngineConfig::default();
    let curve: UpgradeCostCurve = match UpgradeTrack::from_id(track) {
        Some(UpgradeTrack::ClickPower) => config.economy.click_curve,
        Some(UpgradeTrack::AutoFire) => config.economy.auto_fire_curve,
        Some(UpgradeTrack::GemLevel) => config.economy.gem_curve,
        None => return -1.0,
    };
    curve.cost(level)
}

/// Next-level cost under the session's own config; -1 on bad input
#[no_mangle]
pub extern "C" fn idle_get_next_upgrade_cost(handle: *mut IdleEngine, track: u32) -> f64 {
    match (engine_mut(handle), UpgradeTrack::from_id(track)) {
        (Some(engine), Some(track)) => engine.economy().next_upgrade_cost(track),
        _ => -1.0,
    }
}

// ========================
// C-ABI: Boss encounters
// ========================

/// Spawn the boss of `dungeon_id` at the player's level; returns the encounter JSON
#[no_mangle]
pub extern "C" fn idle_spawn_boss(handle: *mut IdleEngine, dungeon_id: *const c_char) -> *mut c_char {
    let (Some(engine), Some(id)) = (engine_mut(handle), parse_cstr(dungeon_id)) else {
        return std::ptr::null_mut();
    };
    match engine.spawn_boss(&id) {
        Ok(boss) => json_to_cstring(&EncounterView::from(boss)),
        Err(e) => {
            tracing::warn!(target: "idle_core::bridge", error = %e, "Spawn rejected");
            std::ptr::null_mut()
        }
    }
}

/// Roll and apply a click hit; null when no boss is accepting damage
#[no_mangle]
pub extern "C" fn idle_hit_boss(handle: *mut IdleEngine) -> *mut c_char {
    match engine_mut(handle).and_then(|engine| engine.hit_boss()) {
        Some(outcome) => json_to_cstring(&outcome),
        None => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn idle_apply_damage(handle: *mut IdleEngine, amount: f64) -> *mut c_char {
    match engine_mut(handle).and_then(|engine| engine.apply_damage(amount)) {
        Some(outcome) => json_to_cstring(&outcome),
        None => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn idle_clear_encounter(handle: *mut IdleEngine) -> bool {
    engine_mut(handle).is_some_and(|engine| engine.clear_encounter().is_some())
}

#[no_mangle]
pub extern "C" fn idle_circles_overlap(ax: f64, ay: f64, ar: f64, bx: f64, by: f64, br: f64) -> bool {
    circles_overlap(&Circle::new(ax, ay, ar), &Circle::new(bx, by, br))
}

// ========================
// C-ABI: Save records
// ========================

/// Migrate any supported save record; returns the `MigrationResult` JSON
#[no_mangle]
pub extern "C" fn idle_migrate_save(save_json: *const c_char) -> *mut c_char {
    match parse_cstr(save_json) {
        Some(json) => json_to_cstring(&savemigration::migrate_save(&json)),
        None => std::ptr::null_mut(),
    }
}

/// Version of a save record, 0 if unreadable
#[no_mangle]
pub extern "C" fn idle_get_save_version(save_json: *const c_char) -> u32 {
    parse_cstr(save_json)
        .and_then(|json| savemigration::get_save_version(&json))
        .unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn idle_validate_save(save_json: *const c_char) -> bool {
    parse_cstr(save_json).is_some_and(|json| savemigration::validate_save(&json))
}
