//! `idle-sim`: headless scripted session.
//!
//! Runs the engine inside a minimal Bevy app with a fixed frame step, plays
//! an auto-clicker that buys the cheapest upgrade it can afford, and prints a
//! balance report at the end.
//!
//! Environment:
//!   IDLE_CONFIG      engine config (.ron or .json), default config/engine.ron if present
//!   IDLE_DUNGEONS    dungeon catalog (.ron), default config/dungeons.ron if present
//!   IDLE_SAVE        save file path, overrides the config
//!   IDLE_SIM_SECONDS simulated seconds to run (default 600)
//!   IDLE_CLICKS      manual clicks per second (default 5)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use idle_core::balance::{self, BuildSpec, SimConfig};
use idle_core::dungeon::DungeonCatalog;
use idle_core::economy::UpgradeTrack;
use idle_core::engine::{
    BossHitRequest, EngineConfig, EngineNotification, EngineResource, IdleEnginePlugin, SpawnBossRequest,
    UpgradeRequest,
};
use idle_core::events::GameEvent;
use idle_core::logging::{LoggingPlugin, TracingConfig};
use idle_core::rewards::RewardIssuer;

const FRAME_SECS: f32 = 0.05;

#[derive(Resource)]
struct Autoplay {
    dungeon_id: String,
    clicks_per_second: f64,
    click_budget: f64,
    defeats: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn load_config() -> Result<EngineConfig> {
    let path = std::env::var("IDLE_CONFIG")
        .map(PathBuf::from)
        .ok()
        .or_else(|| Some(PathBuf::from("config/engine.ron")).filter(|p| p.exists()));
    let mut config = match path {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Ok(save) = std::env::var("IDLE_SAVE") {
        config.persistence.save_path = PathBuf::from(save);
    }
    Ok(config)
}

fn load_catalog() -> Result<DungeonCatalog> {
    let path = std::env::var("IDLE_DUNGEONS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/dungeons.ron"));
    if !Path::new(&path).exists() {
        return Ok(DungeonCatalog::builtin());
    }
    DungeonCatalog::from_file(&path).with_context(|| format!("loading dungeon catalog {}", path.display()))
}

fn main() -> Result<()> {
    let config = load_config()?;
    let catalog = Arc::new(load_catalog()?);
    let sim_seconds: f32 = env_or("IDLE_SIM_SECONDS", 600.0);
    let clicks_per_second: f64 = env_or("IDLE_CLICKS", 5.0);
    let dungeon_id = catalog
        .ids()
        .first()
        .map(|id| id.to_string())
        .context("dungeon catalog is empty")?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LoggingPlugin {
            config: TracingConfig::default(),
        })
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME_SECS)))
        .add_plugins(IdleEnginePlugin {
            config: config.clone(),
            catalog: catalog.clone(),
        })
        .insert_resource(Autoplay {
            dungeon_id,
            clicks_per_second,
            click_budget: 0.0,
            defeats: 0,
        })
        .add_systems(Update, (autoplay_system, report_notifications_system));

    let frames = (sim_seconds / FRAME_SECS).ceil() as u64;
    info!("Simulating {sim_seconds}s ({frames} frames) across {} dungeons", catalog.len());
    for _ in 0..frames {
        app.update();
    }
    app.world_mut().send_event(AppExit::Success);
    app.update();

    let engine_res = app.world().resource::<EngineResource>().clone();
    let engine = engine_res
        .0
        .read()
        .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
    let stats = engine.snapshot();
    let defeats = app.world().resource::<Autoplay>().defeats;
    println!(
        "after {:.0}s: coins={:.0} gems={:.0} click={} auto={} gem={} damage={:.1} bosses={defeats}",
        engine.elapsed(),
        stats.coins,
        stats.gems,
        stats.click_upgrade_level,
        stats.auto_fire_level,
        stats.gem_level,
        stats.damage,
    );

    let sim = SimConfig {
        clicks_per_second,
        build: BuildSpec {
            click_level: stats.click_upgrade_level,
            auto_fire_level: stats.auto_fire_level,
            gem_level: stats.gem_level,
        },
        ..SimConfig::default()
    };
    let report = balance::run_damage_simulation(&sim, &config);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let issuer = RewardIssuer::new(catalog.clone(), config.boss.reward_scaling);
    for def in catalog.iter() {
        println!("{} ({})", def.display.name, def.id);
        for row in balance::level_table(def, &issuer, &sim, &config, 5) {
            println!(
                "  L{:<3} hp={:<10} gems={:<6} coins={:<8} ttk={:.1}s",
                row.level, row.boss_hp, row.gems, row.coins, row.seconds_to_kill
            );
        }
    }
    Ok(())
}

/// Keeps a boss up, clicks at a fixed rate and buys the cheapest affordable upgrade
fn autoplay_system(
    time: Res<Time>,
    engine_res: Res<EngineResource>,
    mut play: ResMut<Autoplay>,
    mut spawns: EventWriter<SpawnBossRequest>,
    mut hits: EventWriter<BossHitRequest>,
    mut upgrades: EventWriter<UpgradeRequest>,
) {
    let Ok(engine) = engine_res.0.read() else {
        return;
    };
    let fighting = engine.encounter().is_some_and(|boss| !boss.is_defeated());
    if !fighting {
        spawns.send(SpawnBossRequest(play.dungeon_id.clone()));
    }

    let clicks = play.clicks_per_second * time.delta_secs_f64();
    play.click_budget += clicks;
    while play.click_budget >= 1.0 {
        play.click_budget -= 1.0;
        hits.send(BossHitRequest);
    }

    let economy = engine.economy();
    let cheapest = UpgradeTrack::ALL
        .into_iter()
        .filter(|track| economy.next_upgrade_cost(*track) <= economy.balance(track.currency()))
        .min_by(|a, b| economy.next_upgrade_cost(*a).total_cmp(&economy.next_upgrade_cost(*b)));
    if let Some(track) = cheapest {
        upgrades.send(UpgradeRequest(track));
    }
}

fn report_notifications_system(mut notes: EventReader<EngineNotification>, mut play: ResMut<Autoplay>) {
    for EngineNotification(event) in notes.read() {
        match event {
            GameEvent::BossDefeated(defeat) => {
                play.defeats += 1;
                info!(
                    "Defeated {} L{} in {} hits: +{} gems, +{} coins",
                    defeat.dungeon_id, defeat.dungeon_level, defeat.hits_taken, defeat.reward.gems, defeat.reward.coins
                );
            }
            GameEvent::SaveFailed { reason } => warn!("Save failed: {reason}"),
            _ => {}
        }
    }
}
