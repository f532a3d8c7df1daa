//! steam-async demo - a minimal game loop driving the callback pipeline
//!
//! # Overview
//!
//! Runs the pipeline end to end against the in-memory [`SimulatedSteam`] SDK:
//! - Logging infrastructure (file rotation + console output)
//! - Configuration loading ([`ConfigManager`])
//! - The subsystem facade ([`SteamSubsystem`]) with its worker thread
//! - A 60 Hz frame loop on a single-threaded tokio runtime
//!
//! Threads:
//! - **Main thread**: the "game thread", ticks the subsystem every frame
//! - **steam-async-worker**: pumps SDK callbacks into the outbound queue
//!
//! # Execution Flow
//!
//! 1. Load settings and the achievement table from `Online Data/`
//! 2. Initialize logging → logs/steam-async.<date>
//! 3. Initialize the subsystem (worker thread, interfaces, first stats request)
//! 4. Once stats arrive: bump a stat, unlock an achievement, set presence
//! 5. Exit when the unlock has been stored, on Ctrl-C, or after 10 seconds
//!
//! # Configuration Files
//!
//! Expected in `Online Data/` (created with defaults when missing):
//! - `Online Settings.yaml`: app id, poll interval, logging, SDK library path
//! - `Achievements.yaml`: `OnlineSubsystemSteam` section with `Achievement_<N>_Id` keys

use anyhow::Result;
use camino::Utf8Path;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use steam_async::models::{ACHIEVEMENT_SECTION, achievement_key};
use steam_async::{
    APP_NAME, AppId, ConfigManager, KeyValueStore, SimulatedSteam, StatsAndAchievements, SteamId,
    SteamSubsystem, VERSION,
};

const FRAME_TIME: Duration = Duration::from_millis(16);
const MAX_FRAMES: u32 = 600;

const DEMO_USER: SteamId = SteamId(76_561_197_960_287_930);

/// App id used when the settings leave it at 0 (Valve's public test app)
const FALLBACK_APP_ID: u32 = 480;

fn demo_achievements() -> KeyValueStore {
    let mut store = KeyValueStore::new();
    for (index, name) in ["ACH_WIN_ONE_GAME", "ACH_WIN_100_GAMES", "ACH_TRAVEL_FAR_ACCUM"]
        .into_iter()
        .enumerate()
    {
        store.set(ACHIEVEMENT_SECTION, achievement_key(index), name);
    }
    store
}

/// Log every delegate and raise `stored` once an achievement unlock is stored
fn subscribe_logging(stats: &mut StatsAndAchievements, stored: Rc<Cell<bool>>) {
    stats.on_user_stats_received().subscribe(|r| {
        tracing::info!(
            "Stats received: user={} success={} result={}",
            r.user,
            r.success,
            r.result
        )
    });
    stats.on_user_stats_stored().subscribe(|r| {
        tracing::info!("Stats stored: success={} result={}", r.success, r.result)
    });
    stats.on_user_stats_unloaded().subscribe(|r| {
        tracing::warn!("Stats unloaded for user {}", r.user)
    });
    stats.on_user_achievement_stored().subscribe(move |r| {
        tracing::info!(
            "Achievement stored: {} (unlocked={})",
            r.achievement_name,
            r.is_unlocked()
        );
        if r.is_unlocked() {
            stored.set(true);
        }
    });
}

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Online Data")?;
    let settings = config_manager.load_settings()?;

    let _log_guard =
        steam_async::logging::setup_logging_from_settings(&settings, "steam-async", true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let mut achievement_store = config_manager.load_achievements()?;
    if achievement_store.section_len(ACHIEVEMENT_SECTION) == 0 {
        achievement_store = demo_achievements();
        config_manager.save_achievements(&achievement_store)?;
    }
    let achievements = steam_async::models::read_achievements(&achievement_store);

    let app_id = AppId(if settings.app_id == 0 {
        FALLBACK_APP_ID
    } else {
        settings.app_id
    });

    let mut sdk = SimulatedSteam::new(app_id, DEMO_USER)
        .with_int_stat("NumGames", 0)
        .with_float_stat("FeetTraveled", 0.0);
    for achievement in &achievements {
        sdk = sdk.with_achievement(&achievement.name, &achievement.name, "", false);
    }
    let sdk = Arc::new(sdk);

    let mut subsystem = SteamSubsystem::new(sdk, settings.clone(), achievements);

    if let Some(path) = settings.sdk_library_path.as_deref() {
        match subsystem.sdk_library_sha1(Utf8Path::new(path)) {
            Ok(hash) => tracing::info!("SDK library SHA-1: {}", hash),
            Err(e) => tracing::warn!("Could not hash SDK library: {:#}", e),
        }
    }

    if settings.require_relaunch && subsystem.restart_app_if_necessary(app_id) {
        return Ok(());
    }

    if settings.initialize_at_startup {
        if let Err(e) = subsystem.initialize() {
            tracing::warn!("Initialize failed, retrying every frame: {}", e);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let stored = Rc::new(Cell::new(false));
    let mut subscribed = false;
    let mut unlocked = false;

    runtime.block_on(async {
        let mut interval = tokio::time::interval(FRAME_TIME);
        let mut frames = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl-C received, stopping");
                    break;
                }
            }

            // Interfaces only exist once initialized
            if !subscribed {
                if let Some(stats) = subsystem.stats_and_achievements_mut() {
                    subscribe_logging(stats, Rc::clone(&stored));
                    subscribed = true;
                }
            }

            subsystem.tick(FRAME_TIME);
            frames += 1;

            let ready = subsystem
                .stats_and_achievements()
                .is_some_and(|stats| stats.has_valid_stats_received());

            if ready && !unlocked {
                unlocked = true;
                if let Some(stats) = subsystem.stats_and_achievements() {
                    let games = stats.get_int_stat("NumGames").unwrap_or(0);
                    if let Err(e) = stats.set_int_stat("NumGames", games + 1) {
                        tracing::error!("Failed to set NumGames: {}", e);
                    }
                    if let Err(e) = stats.unlock_achievement("ACH_WIN_ONE_GAME") {
                        tracing::error!("Failed to unlock achievement: {}", e);
                    }
                }
                if let Some(presence) = subsystem.presence() {
                    if let Err(e) = presence.set_rich_presence_status(DEMO_USER, "Won a game") {
                        tracing::warn!("Failed to set presence: {}", e);
                    }
                }
            }

            if stored.get() {
                tracing::info!("Unlock stored after {} frames", frames);
                break;
            }
            if frames >= MAX_FRAMES {
                tracing::warn!("Gave up after {} frames", frames);
                break;
            }
        }
    });

    subsystem.shutdown();
    subsystem.metrics().log_summary();

    tracing::info!("Demo shutdown complete");
    Ok(())
}
