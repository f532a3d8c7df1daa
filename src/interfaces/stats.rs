// Stats and achievements interface
//
// Synchronous requests go straight to the SDK; their outcomes come back later
// through the task manager as events, which this interface broadcasts to its
// subscribers. Every stat and achievement operation is gated on a successful
// stats-received result for the current user.

use super::delegate::Multicast;
use crate::error::{OnlineError, OnlineResult};
use crate::models::{
    AchievementConfig, ResultCode, SteamId, UserAchievementStored, UserStatsReceived,
    UserStatsStored, UserStatsUnloaded,
};
use crate::sdk::{self, SteamSdk, UserStatsApi};
use crate::tasks::AsyncEventTarget;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const USER_STATS_FACET: &str = "ISteamUserStats";

fn check(succeeded: bool, operation: &str) -> OnlineResult<()> {
    if succeeded {
        Ok(())
    } else {
        Err(OnlineError::CallFailed(operation.to_string()))
    }
}

pub struct StatsAndAchievements {
    sdk: Arc<dyn SteamSdk>,

    /// Set by a stats-received result for the current user
    stats_received_valid: bool,

    achievements: Vec<AchievementConfig>,

    user_stats_received: Multicast<UserStatsReceived>,
    user_stats_stored: Multicast<UserStatsStored>,
    user_stats_unloaded: Multicast<UserStatsUnloaded>,
    user_achievement_stored: Multicast<UserAchievementStored>,
}

impl StatsAndAchievements {
    /// Create the interface and request the current user's stats
    pub fn new(sdk: Arc<dyn SteamSdk>, achievements: Vec<AchievementConfig>) -> Self {
        for achievement in &achievements {
            tracing::debug!("Configured {}", achievement.to_debug_string());
        }

        let mut interface = Self {
            sdk,
            stats_received_valid: false,
            achievements,
            user_stats_received: Multicast::new(),
            user_stats_stored: Multicast::new(),
            user_stats_unloaded: Multicast::new(),
            user_achievement_stored: Multicast::new(),
        };

        if let Err(e) = interface.request_current_stats() {
            tracing::warn!("Initial stats request failed: {}", e);
        }
        interface
    }

    fn user_stats(&self, context: &str) -> OnlineResult<&dyn UserStatsApi> {
        self.sdk.user_stats().ok_or_else(|| {
            tracing::error!("{}: Can't get {}", context, USER_STATS_FACET);
            OnlineError::SdkUnavailable(USER_STATS_FACET)
        })
    }

    /// User stats facet, only once stats have been received
    fn ready_user_stats(&self, context: &str) -> OnlineResult<&dyn UserStatsApi> {
        if !self.stats_received_valid {
            tracing::error!("{}: stats not received yet", context);
            return Err(OnlineError::NotReady);
        }
        self.user_stats(context)
    }

    /// Broadcast a successful stats-received for the current user without
    /// asking the SDK again
    fn broadcast_cached_stats(&mut self, context: &str) {
        tracing::info!("{}: Stats already received", context);
        let result = UserStatsReceived {
            success: true,
            user: sdk::current_user(self.sdk.as_ref()),
            is_current_user: true,
            result: ResultCode::OK,
        };
        self.user_stats_received.broadcast(&result);
    }

    pub fn request_current_stats(&mut self) -> OnlineResult<()> {
        if self.stats_received_valid {
            self.broadcast_cached_stats("RequestCurrentStats");
            return Ok(());
        }

        let user_stats = self.user_stats("RequestCurrentStats")?;
        check(user_stats.request_current_stats(), "RequestCurrentStats")
    }

    pub fn request_user_stats(&mut self, user: SteamId) -> OnlineResult<()> {
        if self.stats_received_valid && sdk::is_current_user(self.sdk.as_ref(), user) {
            self.broadcast_cached_stats("RequestUserStats");
            return Ok(());
        }

        let user_stats = self.user_stats("RequestUserStats")?;
        check(user_stats.request_user_stats(user), "RequestUserStats")
    }

    /// Unlock `name` and store stats so the unlock reaches the server
    pub fn unlock_achievement(&self, name: &str) -> OnlineResult<()> {
        let context = format!("UnlockAchievement(AchievementName = {})", name);
        tracing::info!("{}", context);

        let user_stats = self.ready_user_stats(&context)?;
        check(user_stats.set_achievement(name), "SetAchievement")?;
        self.store_stats()
    }

    /// Lock `name` again, optionally storing right away
    pub fn reset_achievement(&self, name: &str, store: bool) -> OnlineResult<()> {
        let context = format!("ResetAchievement(Name = {}, StoreStats = {})", name, store);
        let user_stats = self.ready_user_stats(&context)?;
        check(user_stats.clear_achievement(name), "ClearAchievement")?;

        if store {
            if let Err(e) = self.store_stats() {
                tracing::warn!("{}: store failed: {}", context, e);
            }
        }
        Ok(())
    }

    /// Resets every stat as well; the SDK stores as part of the reset
    pub fn reset_all_achievements(&self) -> OnlineResult<()> {
        self.ready_user_stats("ResetAllAchievements")?;
        self.reset_all_stats(true)
    }

    pub fn is_achievement_unlocked(&self, name: &str) -> OnlineResult<bool> {
        let context = format!("IsAchievementUnlocked(Name = {})", name);
        self.ready_user_stats(&context)?
            .achievement(name)
            .ok_or_else(|| OnlineError::CallFailed("GetAchievement".to_string()))
    }

    /// `None` while the achievement is locked
    pub fn achievement_unlock_time(&self, name: &str) -> OnlineResult<Option<SystemTime>> {
        let context = format!("GetAchievementUnlockTime(AchievementName = {})", name);
        let Some((unlocked, unix_time)) = self
            .ready_user_stats(&context)?
            .achievement_and_unlock_time(name)
        else {
            tracing::error!("{}: Failed call to GetAchievementAndUnlockTime", context);
            return Err(OnlineError::CallFailed(
                "GetAchievementAndUnlockTime".to_string(),
            ));
        };

        Ok(unlocked.then(|| UNIX_EPOCH + Duration::from_secs(u64::from(unix_time))))
    }

    fn display_attribute(&self, name: &str, key: &str) -> OnlineResult<String> {
        let context = format!("GetAchievementDisplayAttribute(Name = {}, Key = {})", name, key);
        self.ready_user_stats(&context)?
            .achievement_display_attribute(name, key)
            .ok_or_else(|| OnlineError::CallFailed("GetAchievementDisplayAttribute".to_string()))
    }

    pub fn achievement_title(&self, name: &str) -> OnlineResult<String> {
        self.display_attribute(name, "name")
    }

    pub fn achievement_description(&self, name: &str) -> OnlineResult<String> {
        self.display_attribute(name, "desc")
    }

    pub fn is_achievement_hidden(&self, name: &str) -> OnlineResult<bool> {
        Ok(self.display_attribute(name, "hidden")? == "1")
    }

    /// Show the SDK's progress pop-up; answered by an achievement-stored event
    pub fn show_achievement_progress(&self, name: &str, current: u32, max: u32) -> OnlineResult<()> {
        let user_stats = self.user_stats("ShowAchievementProgress")?;
        check(
            user_stats.indicate_achievement_progress(name, current, max),
            "IndicateAchievementProgress",
        )
    }

    pub fn has_valid_stats_received(&self) -> bool {
        self.stats_received_valid
    }

    /// Ask the SDK to upload pending changes; answered by a stats-stored event
    pub fn store_stats(&self) -> OnlineResult<()> {
        let user_stats = self.user_stats("StoreStats")?;
        check(user_stats.store_stats(), "StoreStats")
    }

    pub fn set_int_stat(&self, name: &str, value: i32) -> OnlineResult<()> {
        let context = format!("SetIntStat(StatName = {}, Data = {})", name, value);
        check(self.ready_user_stats(&context)?.set_stat_i32(name, value), "SetStat")
    }

    pub fn set_float_stat(&self, name: &str, value: f32) -> OnlineResult<()> {
        let context = format!("SetFloatStat(StatName = {}, Data = {})", name, value);
        check(self.ready_user_stats(&context)?.set_stat_f32(name, value), "SetStat")
    }

    pub fn get_int_stat(&self, name: &str) -> OnlineResult<i32> {
        let context = format!("GetIntStat(StatName = {})", name);
        self.ready_user_stats(&context)?
            .stat_i32(name)
            .ok_or_else(|| OnlineError::CallFailed("GetStat".to_string()))
    }

    pub fn get_float_stat(&self, name: &str) -> OnlineResult<f32> {
        let context = format!("GetFloatStat(StatName = {})", name);
        self.ready_user_stats(&context)?
            .stat_f32(name)
            .ok_or_else(|| OnlineError::CallFailed("GetStat".to_string()))
    }

    /// Dangerous: wipes the user's stats on the server
    pub fn reset_all_stats(&self, achievements_too: bool) -> OnlineResult<()> {
        let user_stats = self.user_stats("ResetAllStats")?;
        check(user_stats.reset_all_stats(achievements_too), "ResetAllStats")
    }

    pub fn configured_achievements(&self) -> &[AchievementConfig] {
        &self.achievements
    }

    pub fn configured_achievement_names(&self) -> Vec<&str> {
        self.achievements
            .iter()
            .map(|achievement| achievement.name.as_str())
            .collect()
    }

    pub fn on_user_stats_received(&mut self) -> &mut Multicast<UserStatsReceived> {
        &mut self.user_stats_received
    }

    pub fn on_user_stats_stored(&mut self) -> &mut Multicast<UserStatsStored> {
        &mut self.user_stats_stored
    }

    pub fn on_user_stats_unloaded(&mut self) -> &mut Multicast<UserStatsUnloaded> {
        &mut self.user_stats_unloaded
    }

    pub fn on_user_achievement_stored(&mut self) -> &mut Multicast<UserAchievementStored> {
        &mut self.user_achievement_stored
    }
}

impl AsyncEventTarget for StatsAndAchievements {
    fn on_user_stats_received(&mut self, result: UserStatsReceived) {
        if result.is_current_user {
            self.stats_received_valid = result.success;
        }
        self.user_stats_received.broadcast(&result);
    }

    fn on_user_stats_stored(&mut self, result: UserStatsStored) {
        self.user_stats_stored.broadcast(&result);
    }

    fn on_user_stats_unloaded(&mut self, result: UserStatsUnloaded) {
        if result.is_current_user {
            self.stats_received_valid = false;
        }
        self.user_stats_unloaded.broadcast(&result);
    }

    fn on_user_achievement_stored(&mut self, result: UserAchievementStored) {
        self.user_achievement_stored.broadcast(&result);
    }
}
