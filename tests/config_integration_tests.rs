//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Settings loading, saving and defaults
//! - Environment variable overrides on top of the settings file
//! - Achievement table loading from the key-value store
//! - Integration with SteamSubsystem

use camino::Utf8PathBuf;
use std::fs;
use std::sync::Arc;
use steam_async::models::{ACHIEVEMENT_SECTION, achievement_key, read_achievements};
use steam_async::{
    AppId, ConfigManager, KeyValueStore, SimulatedSteam, SteamId, SteamSubsystem,
    SubsystemSettings,
};
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager_creates_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("Online Data");
    let manager = ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
    assert_eq!(manager.config_dir(), &nested);
}

#[test]
fn test_settings_round_trip() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path)
        .unwrap()
        .with_env_prefix("STEAM_ASYNC_ROUND_TRIP");

    let settings = SubsystemSettings {
        app_id: 480,
        poll_interval_ms: 10,
        initialize_at_startup: false,
        require_relaunch: true,
        debug_mode: true,
        log_dir: "custom-logs".to_string(),
        json_logs: true,
        sdk_library_path: Some("steam_api64.dll".to_string()),
    };
    manager.save_settings(&settings).unwrap();

    let contents = fs::read_to_string(manager.settings_path()).unwrap();
    assert!(contents.contains("app_id: 480"));
    assert_eq!(manager.load_settings().unwrap(), settings);
}

#[test]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path)
        .unwrap()
        .with_env_prefix("STEAM_ASYNC_ENV_TEST");
    fs::write(manager.settings_path(), "app_id: 480\npoll_interval_ms: 10\n").unwrap();

    // SAFETY: the variable name is unique to this test
    unsafe {
        std::env::set_var("STEAM_ASYNC_ENV_TEST_APP_ID", "570");
    }
    let settings = manager.load_settings().unwrap();
    unsafe {
        std::env::remove_var("STEAM_ASYNC_ENV_TEST_APP_ID");
    }

    assert_eq!(settings.app_id, 570);
    assert_eq!(settings.poll_interval_ms, 10);
}

#[test]
fn test_malformed_settings_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path)
        .unwrap()
        .with_env_prefix("STEAM_ASYNC_MALFORMED");
    fs::write(manager.settings_path(), "poll_interval_ms: [not, a, number]\n").unwrap();

    assert!(manager.load_settings().is_err());
}

#[test]
fn test_achievement_table_stops_at_gap() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(
        manager.achievements_path(),
        "OnlineSubsystemSteam:\n  Achievement_0_Id: ACH_WIN_ONE_GAME\n  Achievement_1_Id: ACH_WIN_100_GAMES\n  Achievement_3_Id: ACH_UNREACHABLE\n",
    )
    .unwrap();

    let names: Vec<String> = manager
        .load_achievement_configs()
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["ACH_WIN_ONE_GAME", "ACH_WIN_100_GAMES"]);
}

#[test]
fn test_configured_achievements_reach_interface() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let mut store = KeyValueStore::new();
    store.set(ACHIEVEMENT_SECTION, achievement_key(0), "ACH_TRAVEL_FAR_ACCUM");
    manager.save_achievements(&store).unwrap();

    let achievements = read_achievements(&manager.load_achievements().unwrap());
    let sim = Arc::new(SimulatedSteam::new(AppId(480), SteamId(1)));
    let mut subsystem = SteamSubsystem::new(sim, SubsystemSettings::default(), achievements);
    subsystem.initialize().unwrap();

    assert_eq!(
        subsystem
            .stats_and_achievements()
            .unwrap()
            .configured_achievement_names(),
        vec!["ACH_TRAVEL_FAR_ACCUM"]
    );
}
