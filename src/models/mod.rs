//! Data models shared by the pipeline and its interfaces.
//!
//! - [`SteamId`], [`AppId`], [`GameId`]: platform identifiers
//! - [`ResultCode`]: the SDK's result code with descriptions for logging
//! - [`AsyncResult`] and its four records: outcomes delivered to game-thread subscribers
//! - [`SubsystemSettings`], [`KeyValueStore`], [`AchievementConfig`]: configuration models
//!
//! Result records are plain values. They are built once on the worker thread,
//! moved through the outbound queue and handed to subscribers by reference.

pub mod config;
pub mod ids;
pub mod result_code;
pub mod results;

pub use config::{
    ACHIEVEMENT_SECTION, AchievementConfig, KeyValueStore, SubsystemSettings, achievement_key,
    read_achievements,
};
pub use ids::{AppId, GameId, SteamId};
pub use result_code::ResultCode;
pub use results::{
    AsyncResult, UserAchievementStored, UserStatsReceived, UserStatsStored, UserStatsUnloaded,
};
