use bevy::app::AppExit;
use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::dungeon::DungeonCatalog;
use crate::economy::UpgradeTrack;
use crate::engine::config::EngineConfig;
use crate::engine::session::IdleEngine;
use crate::events::GameEvent;
use crate::persistence::FileStore;

/// Runs an `IdleEngine` inside a Bevy app.
///
/// If an `EngineResource` is already present it is used as is; otherwise one
/// is built from `config` with a `FileStore` at `config.persistence.save_path`.
pub struct IdleEnginePlugin {
    pub config: EngineConfig,
    pub catalog: Arc<DungeonCatalog>,
}

impl Default for IdleEnginePlugin {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: Arc::new(DungeonCatalog::builtin()),
        }
    }
}

impl Plugin for IdleEnginePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<EngineResource>() {
            let store = FileStore::new(self.config.persistence.save_path.clone());
            let engine = IdleEngine::new(self.config.clone(), self.catalog.clone(), Box::new(store));
            app.insert_resource(EngineResource::new(engine));
        }

        app.add_event::<UpgradeRequest>()
            .add_event::<SpawnBossRequest>()
            .add_event::<BossHitRequest>()
            .add_event::<AutoFireShot>()
            .add_event::<EngineNotification>()
            .add_systems(
                Update,
                (
                    engine_tick_system,
                    handle_requests_system,
                    auto_fire_system,
                    forward_notifications_system,
                )
                    .chain(),
            )
            .add_systems(Last, flush_on_exit_system);
    }
}

#[derive(Resource, Clone)]
pub struct EngineResource(pub Arc<RwLock<IdleEngine>>);

impl EngineResource {
    pub fn new(engine: IdleEngine) -> Self {
        Self(Arc::new(RwLock::new(engine)))
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct UpgradeRequest(pub UpgradeTrack);

#[derive(Event, Debug, Clone)]
pub struct SpawnBossRequest(pub String);

/// A manual click on the current boss
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct BossHitRequest;

/// Auto-fire shots that came due this frame
#[derive(Event, Debug, Clone, Copy)]
pub struct AutoFireShot {
    pub shots: u32,
}

#[derive(Event, Debug, Clone)]
pub struct EngineNotification(pub GameEvent);

fn engine_tick_system(time: Res<Time>, engine_res: Res<EngineResource>, mut shots: EventWriter<AutoFireShot>) {
    if let Ok(mut engine) = engine_res.0.write() {
        let due = engine.tick(time.delta_secs());
        if due > 0 {
            shots.send(AutoFireShot { shots: due });
        }
    }
}

fn handle_requests_system(
    engine_res: Res<EngineResource>,
    mut upgrades: EventReader<UpgradeRequest>,
    mut spawns: EventReader<SpawnBossRequest>,
    mut hits: EventReader<BossHitRequest>,
) {
    let Ok(mut engine) = engine_res.0.write() else {
        return;
    };
    for UpgradeRequest(track) in upgrades.read() {
        engine.upgrade(*track);
    }
    for SpawnBossRequest(dungeon_id) in spawns.read() {
        if let Err(e) = engine.spawn_boss(dungeon_id) {
            warn!("Spawn request rejected: {e}");
        }
    }
    for _ in hits.read() {
        engine.hit_boss();
    }
}

/// Auto-fire shots land on the active boss, if any
fn auto_fire_system(engine_res: Res<EngineResource>, mut shots: EventReader<AutoFireShot>) {
    let Ok(mut engine) = engine_res.0.write() else {
        return;
    };
    for shot in shots.read() {
        for _ in 0..shot.shots {
            if engine.hit_boss().is_none() {
                break;
            }
        }
    }
}

fn forward_notifications_system(engine_res: Res<EngineResource>, mut out: EventWriter<EngineNotification>) {
    if let Ok(mut engine) = engine_res.0.write() {
        for event in engine.drain_events() {
            out.send(EngineNotification(event));
        }
    }
}

fn flush_on_exit_system(engine_res: Res<EngineResource>, mut exits: EventReader<AppExit>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Ok(mut engine) = engine_res.0.write() {
        if let Err(e) = engine.shutdown() {
            error!("Final save failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{self, MemoryStore};

    fn test_app() -> (App, MemoryStore) {
        let store = MemoryStore::new();
        let engine = IdleEngine::new(
            EngineConfig::default(),
            Arc::new(DungeonCatalog::builtin()),
            Box::new(store.clone()),
        );
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(EngineResource::new(engine))
            .add_plugins(IdleEnginePlugin::default());
        (app, store)
    }

    #[test]
    fn test_upgrade_request_applied() {
        let (mut app, _) = test_app();
        let engine = app.world().resource::<EngineResource>().clone();
        engine.0.write().unwrap().add_currency(10.0);
        app.world_mut().send_event(UpgradeRequest(UpgradeTrack::ClickPower));
        app.update();
        let engine = engine.0.read().unwrap();
        assert_eq!(engine.economy().level(UpgradeTrack::ClickPower), 1);
        assert_eq!(engine.economy().coins(), 0.0);
    }

    #[test]
    fn test_spawn_and_hit_requests() {
        let (mut app, _) = test_app();
        app.world_mut().send_event(SpawnBossRequest("goblin_cave".into()));
        app.update();
        app.world_mut().send_event(BossHitRequest);
        app.update();
        let engine = app.world().resource::<EngineResource>().0.read().unwrap();
        let boss = engine.encounter().expect("boss spawned");
        assert_eq!(boss.hits_taken(), 1);
        assert_eq!(engine.economy().coins(), 100.0 - boss.current_hp());
        assert!(engine.economy().coins() > 0.0);
    }

    #[test]
    fn test_auto_fire_shots_earn_coins_until_defeat() {
        let (mut app, _) = test_app();
        app.world_mut().send_event(SpawnBossRequest("goblin_cave".into()));
        app.update();
        app.world_mut().send_event(AutoFireShot { shots: 3 });
        app.update();
        let engine = app.world().resource::<EngineResource>().clone();
        let coins_after_shots = engine.0.read().unwrap().economy().coins();
        assert!(coins_after_shots > 0.0);

        let hp = engine.0.read().unwrap().encounter().unwrap().current_hp();
        engine.0.write().unwrap().apply_damage(hp).unwrap();
        let coins_after_kill = engine.0.read().unwrap().economy().coins();
        // 100 HP removed in total plus the level 1 reward
        assert_eq!(coins_after_kill, 125.0);

        app.world_mut().send_event(AutoFireShot { shots: 5 });
        app.world_mut().send_event(BossHitRequest);
        app.update();
        assert_eq!(engine.0.read().unwrap().economy().coins(), coins_after_kill);
    }

    #[test]
    fn test_notifications_forwarded() {
        let (mut app, _) = test_app();
        app.world_mut().send_event(SpawnBossRequest("goblin_cave".into()));
        app.update();
        let events = app.world().resource::<Events<EngineNotification>>();
        let mut reader = events.get_cursor();
        let kinds: Vec<_> = reader.read(events).map(|n| n.0.kind()).collect();
        assert!(kinds.contains(&"BossSpawned"));
    }

    #[test]
    fn test_app_exit_flushes_save() {
        let (mut app, store) = test_app();
        app.world()
            .resource::<EngineResource>()
            .0
            .write()
            .unwrap()
            .add_currency(77.0);
        app.world_mut().send_event(AppExit::Success);
        app.update();
        assert_eq!(persistence::load_or_default(&store).coins, 77.0);
    }
}
