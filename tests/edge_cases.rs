//! Edge case & boundary tests
//!
//! Tests behavior at the bridge boundary:
//! - Null handles and null string inputs → null / false / -1, never a crash
//! - Malformed JSON configs and save records
//! - Non-finite and negative amounts
//! - Unknown dungeons and upgrade tracks
//! - free_string on null

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use idle_core::bridge::*;

// ============================================================
// Helpers
// ============================================================

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

fn ptr_to_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null(), "FFI returned null pointer");
    let s = unsafe { CStr::from_ptr(ptr).to_str().unwrap().to_owned() };
    free_string(ptr);
    s
}

// ============================================================
// 1. Null handle safety
// ============================================================

#[test]
fn null_handle_economy_calls() {
    let null = ptr::null_mut();
    assert!(!idle_add_coins(null, 10.0));
    assert!(!idle_try_spend(null, 1.0));
    assert!(!idle_upgrade(null, 0));
    assert_eq!(idle_get_next_upgrade_cost(null, 0), -1.0);
    assert!(!idle_flush(null));
}

#[test]
fn null_handle_returns_null_strings() {
    let null = ptr::null_mut();
    assert!(idle_get_state_json(null).is_null());
    assert!(idle_poll_events(null).is_null());
    assert!(idle_hit_boss(null).is_null());
    assert!(idle_apply_damage(null, 5.0).is_null());
    let id = cstr("goblin_cave");
    assert!(idle_spawn_boss(null, id.as_ptr()).is_null());
}

#[test]
fn null_handle_tick_is_minus_one() {
    assert_eq!(idle_tick(ptr::null_mut(), 0.016), -1);
}

#[test]
fn destroy_null_is_noop() {
    idle_engine_destroy(ptr::null_mut());
}

#[test]
fn free_string_null_is_noop() {
    free_string(ptr::null_mut());
}

#[test]
fn null_save_inputs() {
    assert!(idle_migrate_save(ptr::null()).is_null());
    assert_eq!(idle_get_save_version(ptr::null()), 0);
    assert!(!idle_validate_save(ptr::null()));
}

// ============================================================
// 2. Malformed inputs
// ============================================================

#[test]
fn malformed_config_json_rejected() {
    let bad = cstr("{ this is not json");
    assert!(idle_engine_create_in_memory(bad.as_ptr()).is_null());
    assert!(idle_engine_create(bad.as_ptr(), ptr::null()).is_null());
}

#[test]
fn malformed_catalog_rejected() {
    let bad = cstr("(dungeons: [])");
    assert!(idle_engine_create_with_catalog(ptr::null(), bad.as_ptr(), ptr::null()).is_null());
}

#[test]
fn malformed_save_record() {
    let junk = cstr("[1, 2, 3]");
    let result: serde_json::Value = serde_json::from_str(&ptr_to_string(idle_migrate_save(junk.as_ptr()))).unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(idle_get_save_version(junk.as_ptr()), 0);
}

#[test]
fn null_spawn_id() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert!(idle_spawn_boss(handle, ptr::null()).is_null());
    idle_engine_destroy(handle);
}

// ============================================================
// 3. Amount boundaries
// ============================================================

#[test]
fn non_finite_and_negative_amounts_rejected() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert!(!idle_add_coins(handle, -1.0));
    assert!(!idle_add_coins(handle, f64::NAN));
    assert!(!idle_add_coins(handle, f64::INFINITY));
    assert!(!idle_try_spend(handle, -5.0));
    let state: serde_json::Value = serde_json::from_str(&ptr_to_string(idle_get_state_json(handle))).unwrap();
    assert_eq!(state["player"]["coins"], 0.0);
    idle_engine_destroy(handle);
}

#[test]
fn zero_amounts_are_noops() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert!(idle_add_coins(handle, 0.0));
    assert!(idle_try_spend(handle, 0.0));
    idle_engine_destroy(handle);
}

#[test]
fn huge_balance_stays_finite() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert!(idle_add_coins(handle, f64::MAX));
    assert!(!idle_add_coins(handle, f64::MAX), "overflow to infinity must be rejected");
    idle_engine_destroy(handle);
}

#[test]
fn spend_exact_balance() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert!(idle_add_coins(handle, 10.0));
    assert!(!idle_try_spend(handle, 10.000001));
    assert!(idle_try_spend(handle, 10.0));
    assert!(!idle_try_spend(handle, 0.000001));
    idle_engine_destroy(handle);
}

// ============================================================
// 4. Invalid ids
// ============================================================

#[test]
fn unknown_upgrade_track() {
    let handle = idle_engine_create_in_memory(ptr::null());
    idle_add_coins(handle, 1e9);
    assert!(!idle_upgrade(handle, 3));
    assert!(!idle_upgrade(handle, u32::MAX));
    assert_eq!(idle_get_upgrade_cost(u32::MAX, 0), -1.0);
    idle_engine_destroy(handle);
}

#[test]
fn unknown_dungeon_spawn() {
    let handle = idle_engine_create_in_memory(ptr::null());
    let id = cstr("no_such_dungeon");
    assert!(idle_spawn_boss(handle, id.as_ptr()).is_null());
    assert!(idle_hit_boss(handle).is_null(), "no encounter means no hit");
    idle_engine_destroy(handle);
}

#[test]
fn hits_after_defeat_are_ignored() {
    let handle = idle_engine_create_in_memory(ptr::null());
    let id = cstr("goblin_cave");
    ptr_to_string(idle_spawn_boss(handle, id.as_ptr()));
    let outcome: serde_json::Value = serde_json::from_str(&ptr_to_string(idle_apply_damage(handle, 1e6))).unwrap();
    assert_eq!(outcome["defeated"], true);
    assert_eq!(outcome["coins_earned"], 100.0);
    assert!(idle_apply_damage(handle, 1.0).is_null());
    assert!(idle_hit_boss(handle).is_null());
    let state: serde_json::Value = serde_json::from_str(&ptr_to_string(idle_get_state_json(handle))).unwrap();
    assert_eq!(state["player"]["coins"], 125.0);
    assert!(idle_clear_encounter(handle));
    assert!(!idle_clear_encounter(handle));
    idle_engine_destroy(handle);
}

#[test]
fn zero_and_negative_damage_ignored() {
    let handle = idle_engine_create_in_memory(ptr::null());
    let id = cstr("goblin_cave");
    ptr_to_string(idle_spawn_boss(handle, id.as_ptr()));
    assert!(idle_apply_damage(handle, 0.0).is_null());
    assert!(idle_apply_damage(handle, -10.0).is_null());
    assert!(idle_apply_damage(handle, f64::NAN).is_null());
    idle_engine_destroy(handle);
}

// ============================================================
// 5. Timing & geometry boundaries
// ============================================================

#[test]
fn tick_with_bad_delta() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert_eq!(idle_tick(handle, f32::NAN), 0);
    assert_eq!(idle_tick(handle, -1.0), 0);
    assert_eq!(idle_tick(handle, 0.0), 0);
    idle_engine_destroy(handle);
}

#[test]
fn auto_fire_disabled_until_upgraded() {
    let handle = idle_engine_create_in_memory(ptr::null());
    assert_eq!(idle_tick(handle, 60.0), 0);
    idle_add_coins(handle, 50.0);
    assert!(idle_upgrade(handle, 1));
    assert_eq!(idle_tick(handle, 2.0), 2);
    idle_engine_destroy(handle);
}

#[test]
fn touching_circles_do_not_overlap() {
    assert!(!idle_circles_overlap(0.0, 0.0, 1.0, 2.0, 0.0, 1.0));
    assert!(idle_circles_overlap(0.0, 0.0, 1.0, 1.999, 0.0, 1.0));
    assert!(!idle_circles_overlap(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    assert!(!idle_circles_overlap(0.0, 0.0, f64::NAN, 0.0, 0.0, 1.0));
}
