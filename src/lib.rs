// steam-async - Background-thread callback pipeline for Steam stats and achievements
//
// This is the library crate containing the pipeline, its interfaces and the
// SDK abstraction. The binary crate (main.rs) is a demo game loop driving
// the pipeline against the simulated SDK.

pub mod config;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod sdk;
pub mod subsystem;
pub mod tasks;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{OnlineError, OnlineResult};
pub use interfaces::{ExternalUi, Multicast, Presence, StatsAndAchievements, SubscriptionHandle};
pub use metrics::PipelineMetrics;
pub use models::{
    AchievementConfig, AppId, AsyncResult, GameId, KeyValueStore, ResultCode, SteamId,
    SubsystemSettings, UserAchievementStored, UserStatsReceived, UserStatsStored,
    UserStatsUnloaded,
};
pub use sdk::{RawCallback, SimulatedSteam, SteamSdk};
pub use subsystem::SteamSubsystem;
pub use tasks::{AsyncEvent, AsyncEventTarget, AsyncTaskManager, CallbackRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
