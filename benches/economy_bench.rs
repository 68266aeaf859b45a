use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use idle_core::bridge::*;
use idle_core::combat::resolve_hit;
use idle_core::dungeon::DungeonCatalog;
use idle_core::economy::{Economy, PlayerState, UpgradeCostCurve, UpgradeTrack};
use idle_core::engine::{EngineConfig, IdleEngine};
use idle_core::persistence::MemoryStore;
use idle_core::savemigration;

fn bench_cost_curves(c: &mut Criterion) {
    let curve = UpgradeCostCurve::new(10.0, 1.5);
    c.bench_function("upgrade_cost_level_50", |b| {
        b.iter(|| curve.cost(black_box(50)))
    });

    c.bench_function("affordable_levels_1e12", |b| {
        b.iter(|| curve.affordable_levels(black_box(0), black_box(1e12)))
    });
}

fn bench_economy(c: &mut Criterion) {
    c.bench_function("economy_add_and_upgrade", |b| {
        let mut eco = Economy::new(PlayerState::default(), &EngineConfig::default(), Box::new(MemoryStore::new()));
        b.iter(|| {
            eco.add_currency(black_box(1e6)).ok();
            eco.upgrade(black_box(UpgradeTrack::ClickPower));
        })
    });

    c.bench_function("economy_snapshot", |b| {
        let eco = Economy::new(PlayerState::default(), &EngineConfig::default(), Box::new(MemoryStore::new()));
        b.iter(|| black_box(eco.snapshot()))
    });
}

fn bench_combat(c: &mut Criterion) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    c.bench_function("resolve_hit", |b| {
        b.iter(|| resolve_hit(&mut rng, black_box(125.0), 0.1, 2.0, 0.02, 3.0))
    });

    c.bench_function("engine_hit_boss_cycle", |b| {
        let mut engine = IdleEngine::new(
            EngineConfig::default(),
            Arc::new(DungeonCatalog::builtin()),
            Box::new(MemoryStore::new()),
        );
        engine.spawn_boss("goblin_cave").ok();
        b.iter(|| {
            if engine.hit_boss().is_none() {
                engine.spawn_boss("goblin_cave").ok();
            }
            engine.drain_events();
        })
    });
}

fn bench_persistence(c: &mut Criterion) {
    let mut state = PlayerState {
        coins: 123_456.75,
        gems: 42.0,
        click_upgrade_level: 30,
        auto_fire_level: 12,
        gem_level: 4,
        ..Default::default()
    };
    for i in 0..20 {
        state.dungeon_progress.insert(format!("dungeon_{i}"), i + 1);
    }
    let encoded = savemigration::encode_save(&state).unwrap();

    c.bench_function("encode_save", |b| {
        b.iter(|| savemigration::encode_save(black_box(&state)).unwrap())
    });

    c.bench_function("decode_save", |b| {
        b.iter(|| savemigration::decode_save(black_box(&encoded)).unwrap())
    });
}

fn bench_ffi(c: &mut Criterion) {
    let handle = idle_engine_create_in_memory(std::ptr::null());
    c.bench_function("ffi_get_state_json", |b| {
        b.iter(|| {
            let ptr = idle_get_state_json(black_box(handle));
            free_string(ptr);
        })
    });
    idle_engine_destroy(handle);
}

criterion_group!(
    benches,
    bench_cost_curves,
    bench_economy,
    bench_combat,
    bench_persistence,
    bench_ffi,
);
criterion_main!(benches);
