//! Narrow interface to the platform SDK.
//!
//! The pipeline never talks to a concrete SDK. It is handed an
//! `Arc<dyn SteamSdk>` and reaches the SDK's facets through it:
//!
//! - [`UserStatsApi`]: stats and achievements
//! - [`FriendsApi`]: rich presence
//! - [`UtilsApi`]: app id, current user, language
//! - [`OverlayApi`]: in-game overlay dialogs
//!
//! A facet accessor returning `None` means the SDK could not hand out that
//! interface; callers report [`OnlineError::SdkUnavailable`](crate::OnlineError::SdkUnavailable).
//!
//! Asynchronous results come back as [`RawCallback`]s, delivered synchronously
//! from inside [`SteamSdk::run_callbacks`] on whichever thread pumps it.

pub mod simulated;

pub use simulated::SimulatedSteam;

use crate::models::{AppId, GameId, ResultCode, SteamId};

/// Maximum number of rich presence keys per user
pub const MAX_RICH_PRESENCE_KEYS: usize = 30;
/// Keys must be shorter than this
pub const MAX_RICH_PRESENCE_KEY_LENGTH: usize = 64;
/// Values must be shorter than this
pub const MAX_RICH_PRESENCE_VALUE_LENGTH: usize = 256;

/// Kinds of SDK callbacks the pipeline handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    UserStatsReceived,
    UserStatsStored,
    UserStatsUnloaded,
    UserAchievementStored,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 4] = [
        CallbackKind::UserStatsReceived,
        CallbackKind::UserStatsStored,
        CallbackKind::UserStatsUnloaded,
        CallbackKind::UserAchievementStored,
    ];
}

/// Raw callback payload as produced by the SDK
#[derive(Debug, Clone, PartialEq)]
pub enum RawCallback {
    UserStatsReceived {
        game_id: GameId,
        result: ResultCode,
        user: SteamId,
    },
    UserStatsStored {
        game_id: GameId,
        result: ResultCode,
    },
    UserStatsUnloaded {
        user: SteamId,
    },
    UserAchievementStored {
        game_id: GameId,
        group_achievement: bool,
        achievement_name: String,
        current_progress: u32,
        max_progress: u32,
    },
}

impl RawCallback {
    pub fn kind(&self) -> CallbackKind {
        match self {
            RawCallback::UserStatsReceived { .. } => CallbackKind::UserStatsReceived,
            RawCallback::UserStatsStored { .. } => CallbackKind::UserStatsStored,
            RawCallback::UserStatsUnloaded { .. } => CallbackKind::UserStatsUnloaded,
            RawCallback::UserAchievementStored { .. } => CallbackKind::UserAchievementStored,
        }
    }

    /// Game id the callback is tagged with (stats-unloaded carries none)
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            RawCallback::UserStatsReceived { game_id, .. }
            | RawCallback::UserStatsStored { game_id, .. }
            | RawCallback::UserAchievementStored { game_id, .. } => Some(*game_id),
            RawCallback::UserStatsUnloaded { .. } => None,
        }
    }
}

/// Overlay dialogs that can be opened through [`OverlayApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayDialog {
    Friends,
    Community,
    Players,
    Settings,
    Stats,
    Achievements,
}

impl OverlayDialog {
    /// Dialog name understood by the SDK
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayDialog::Friends => "friends",
            OverlayDialog::Community => "community",
            OverlayDialog::Players => "players",
            OverlayDialog::Settings => "settings",
            OverlayDialog::Stats => "stats",
            OverlayDialog::Achievements => "achievements",
        }
    }
}

/// Stats and achievements facet (`ISteamUserStats`)
#[cfg_attr(test, mockall::automock)]
pub trait UserStatsApi: Send + Sync {
    /// Async: answered by a `UserStatsReceived` callback
    fn request_current_stats(&self) -> bool;
    /// Async: answered by a `UserStatsReceived` callback
    fn request_user_stats(&self, user: SteamId) -> bool;
    /// Async: answered by a `UserStatsStored` callback
    fn store_stats(&self) -> bool;

    fn set_achievement(&self, name: &str) -> bool;
    fn clear_achievement(&self, name: &str) -> bool;
    fn achievement(&self, name: &str) -> Option<bool>;
    /// `(unlocked, unlock unix time)`
    fn achievement_and_unlock_time(&self, name: &str) -> Option<(bool, u32)>;
    fn achievement_display_attribute(&self, name: &str, key: &str) -> Option<String>;
    /// Async: answered by a `UserAchievementStored` callback
    fn indicate_achievement_progress(&self, name: &str, current: u32, max: u32) -> bool;

    fn set_stat_i32(&self, name: &str, value: i32) -> bool;
    fn set_stat_f32(&self, name: &str, value: f32) -> bool;
    fn stat_i32(&self, name: &str) -> Option<i32>;
    fn stat_f32(&self, name: &str) -> Option<f32>;

    /// Also stores stats on the server
    fn reset_all_stats(&self, achievements_too: bool) -> bool;
}

/// Rich presence facet (`ISteamFriends`)
#[cfg_attr(test, mockall::automock)]
pub trait FriendsApi: Send + Sync {
    fn set_rich_presence(&self, key: &str, value: &str) -> bool;
    fn clear_rich_presence(&self);
}

/// Utility facet (`ISteamUtils`, `ISteamUser`, `ISteamApps`)
#[cfg_attr(test, mockall::automock)]
pub trait UtilsApi: Send + Sync {
    fn app_id(&self) -> AppId;
    fn game_id(&self) -> GameId;
    /// Currently logged on user
    fn steam_id(&self) -> SteamId;
    fn current_game_language(&self) -> String;
}

/// In-game overlay facet
#[cfg_attr(test, mockall::automock)]
pub trait OverlayApi: Send + Sync {
    fn activate_game_overlay(&self, dialog: OverlayDialog);
    fn activate_game_overlay_to_web_page(&self, url: &str);
    fn is_overlay_enabled(&self) -> bool;
}

/// Entry point to the platform SDK
pub trait SteamSdk: Send + Sync {
    fn init(&self) -> bool;
    fn shutdown(&self);
    fn is_enabled(&self) -> bool;

    /// True when the SDK relaunched the game through the platform client and
    /// the current process must exit
    fn restart_app_if_necessary(&self, app_id: AppId) -> bool;

    /// Fires every pending callback through `dispatch`, on the calling thread
    fn run_callbacks(&self, dispatch: &mut dyn FnMut(RawCallback));

    fn user_stats(&self) -> Option<&dyn UserStatsApi>;
    fn friends(&self) -> Option<&dyn FriendsApi>;
    fn utils(&self) -> Option<&dyn UtilsApi>;
    fn overlay(&self) -> Option<&dyn OverlayApi>;
}

/// Whether `game_id` identifies the running application
pub fn is_current_game(sdk: &dyn SteamSdk, game_id: GameId) -> bool {
    sdk.utils().is_some_and(|utils| utils.game_id() == game_id)
}

/// Whether `user` is the logged on user
pub fn is_current_user(sdk: &dyn SteamSdk, user: SteamId) -> bool {
    sdk.utils().is_some_and(|utils| utils.steam_id() == user)
}

/// Logged on user, or [`SteamId::NIL`] when the SDK cannot tell
pub fn current_user(sdk: &dyn SteamSdk) -> SteamId {
    sdk.utils().map_or(SteamId::NIL, |utils| utils.steam_id())
}
