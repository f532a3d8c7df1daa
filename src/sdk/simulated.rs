//! In-memory SDK
//!
//! Behaves like the platform SDK closely enough to drive the whole pipeline
//! without the real library: requests queue callbacks, and the callbacks are
//! fired from [`SteamSdk::run_callbacks`] on whichever thread pumps it.
//! Tests can also inject arbitrary raw callbacks with [`SimulatedSteam::push_callback`].

use super::{
    FriendsApi, MAX_RICH_PRESENCE_KEY_LENGTH, MAX_RICH_PRESENCE_KEYS, MAX_RICH_PRESENCE_VALUE_LENGTH,
    OverlayApi, OverlayDialog, RawCallback, SteamSdk, UserStatsApi, UtilsApi,
};
use crate::models::{AppId, GameId, ResultCode, SteamId};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Default)]
struct SimAchievement {
    title: String,
    description: String,
    hidden: bool,
    unlocked: bool,
    unlock_time: u32,
    /// Unlock already reported through a store
    stored: bool,
}

#[derive(Debug, Default)]
struct SimState {
    stats_loaded: bool,
    int_stats: IndexMap<String, i32>,
    float_stats: IndexMap<String, f32>,
    achievements: IndexMap<String, SimAchievement>,
    presence: IndexMap<String, String>,
    overlay_history: Vec<String>,
    fail_next_store: Option<ResultCode>,
}

/// Simulated platform SDK
pub struct SimulatedSteam {
    app_id: AppId,
    user: SteamId,
    language: String,

    init_succeeds: AtomicBool,
    enabled: AtomicBool,
    requires_relaunch: AtomicBool,
    user_stats_available: AtomicBool,
    overlay_enabled: AtomicBool,

    state: Mutex<SimState>,
    pending: Mutex<VecDeque<RawCallback>>,

    /// Number of `run_callbacks` pumps so far
    pumps: AtomicU64,
}

impl SimulatedSteam {
    pub fn new(app_id: AppId, user: SteamId) -> Self {
        Self {
            app_id,
            user,
            language: "english".to_string(),
            init_succeeds: AtomicBool::new(true),
            enabled: AtomicBool::new(false),
            requires_relaunch: AtomicBool::new(false),
            user_stats_available: AtomicBool::new(true),
            overlay_enabled: AtomicBool::new(true),
            state: Mutex::new(SimState::default()),
            pending: Mutex::new(VecDeque::new()),
            pumps: AtomicU64::new(0),
        }
    }

    /// Declare an achievement with its display attributes
    pub fn with_achievement(self, name: &str, title: &str, description: &str, hidden: bool) -> Self {
        self.lock_state().achievements.insert(
            name.to_string(),
            SimAchievement {
                title: title.to_string(),
                description: description.to_string(),
                hidden,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_int_stat(self, name: &str, value: i32) -> Self {
        self.lock_state().int_stats.insert(name.to_string(), value);
        self
    }

    pub fn with_float_stat(self, name: &str, value: f32) -> Self {
        self.lock_state().float_stats.insert(name.to_string(), value);
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn game_id(&self) -> GameId {
        GameId::from(self.app_id)
    }

    pub fn user(&self) -> SteamId {
        self.user
    }

    /// Make the next `init()` fail (or succeed again)
    pub fn set_init_succeeds(&self, succeeds: bool) {
        self.init_succeeds.store(succeeds, Ordering::SeqCst);
    }

    pub fn set_requires_relaunch(&self, relaunch: bool) {
        self.requires_relaunch.store(relaunch, Ordering::SeqCst);
    }

    /// Make [`SteamSdk::user_stats`] return `None`
    pub fn set_user_stats_available(&self, available: bool) {
        self.user_stats_available.store(available, Ordering::SeqCst);
    }

    pub fn set_overlay_enabled(&self, enabled: bool) {
        self.overlay_enabled.store(enabled, Ordering::SeqCst);
    }

    /// The next store (explicit or from a reset) reports `code`
    pub fn fail_next_store(&self, code: ResultCode) {
        self.lock_state().fail_next_store = Some(code);
    }

    /// Queue a raw callback to be fired on the next pump
    pub fn push_callback(&self, callback: RawCallback) {
        self.lock_pending().push_back(callback);
    }

    /// Callbacks queued but not yet fired
    pub fn pending_callbacks(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn pump_count(&self) -> u64 {
        self.pumps.load(Ordering::Relaxed)
    }

    /// Snapshot of the current user's rich presence
    pub fn presence(&self) -> IndexMap<String, String> {
        self.lock_state().presence.clone()
    }

    /// Every overlay dialog or URL opened so far
    pub fn overlay_history(&self) -> Vec<String> {
        self.lock_state().overlay_history.clone()
    }

    /// Simulate the SDK unloading the user's stats
    pub fn unload_user_stats(&self, user: SteamId) {
        if user == self.user {
            self.lock_state().stats_loaded = false;
        }
        self.push_callback(RawCallback::UserStatsUnloaded { user });
    }

    fn lock_state(&self) -> MutexGuard<'_, SimState> {
        // A panicking test thread must not wedge the simulation for the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<RawCallback>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_ready(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Queue the callbacks a store produces: one stats-stored, plus one
    /// achievement-stored per newly unlocked achievement on success
    fn queue_store(&self, state: &mut SimState) {
        let result = state.fail_next_store.take().unwrap_or(ResultCode::OK);
        let game_id = self.game_id();
        let mut callbacks = vec![RawCallback::UserStatsStored { game_id, result }];

        if result.is_success() {
            for (name, achievement) in state.achievements.iter_mut() {
                if achievement.unlocked && !achievement.stored {
                    achievement.stored = true;
                    callbacks.push(RawCallback::UserAchievementStored {
                        game_id,
                        group_achievement: false,
                        achievement_name: name.clone(),
                        current_progress: 0,
                        max_progress: 0,
                    });
                }
            }
        }

        self.lock_pending().extend(callbacks);
    }
}

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

impl SteamSdk for SimulatedSteam {
    fn init(&self) -> bool {
        let succeeds = self.init_succeeds.load(Ordering::SeqCst);
        if succeeds {
            self.enabled.store(true, Ordering::SeqCst);
        }
        succeeds
    }

    fn shutdown(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        app_id.raw() != 0 && self.requires_relaunch.load(Ordering::SeqCst)
    }

    fn run_callbacks(&self, dispatch: &mut dyn FnMut(RawCallback)) {
        self.pumps.fetch_add(1, Ordering::Relaxed);

        // Take the batch first so handlers may queue new requests while firing
        let batch: Vec<RawCallback> = self.lock_pending().drain(..).collect();
        for callback in batch {
            dispatch(callback);
        }
    }

    fn user_stats(&self) -> Option<&dyn UserStatsApi> {
        (self.is_ready() && self.user_stats_available.load(Ordering::SeqCst))
            .then_some(self as &dyn UserStatsApi)
    }

    fn friends(&self) -> Option<&dyn FriendsApi> {
        self.is_ready().then_some(self as &dyn FriendsApi)
    }

    fn utils(&self) -> Option<&dyn UtilsApi> {
        self.is_ready().then_some(self as &dyn UtilsApi)
    }

    fn overlay(&self) -> Option<&dyn OverlayApi> {
        self.is_ready().then_some(self as &dyn OverlayApi)
    }
}

impl UserStatsApi for SimulatedSteam {
    fn request_current_stats(&self) -> bool {
        self.request_user_stats(self.user)
    }

    fn request_user_stats(&self, user: SteamId) -> bool {
        let result = if user == self.user {
            self.lock_state().stats_loaded = true;
            ResultCode::OK
        } else {
            // Nobody else has stats entries in the simulation
            ResultCode::FAIL
        };

        self.push_callback(RawCallback::UserStatsReceived {
            game_id: self.game_id(),
            result,
            user,
        });
        true
    }

    fn store_stats(&self) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }
        self.queue_store(&mut state);
        true
    }

    fn set_achievement(&self, name: &str) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }
        match state.achievements.get_mut(name) {
            Some(achievement) => {
                if !achievement.unlocked {
                    achievement.unlocked = true;
                    achievement.unlock_time = unix_now();
                }
                true
            }
            None => false,
        }
    }

    fn clear_achievement(&self, name: &str) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }
        match state.achievements.get_mut(name) {
            Some(achievement) => {
                achievement.unlocked = false;
                achievement.unlock_time = 0;
                achievement.stored = false;
                true
            }
            None => false,
        }
    }

    fn achievement(&self, name: &str) -> Option<bool> {
        self.achievement_and_unlock_time(name).map(|(unlocked, _)| unlocked)
    }

    fn achievement_and_unlock_time(&self, name: &str) -> Option<(bool, u32)> {
        let state = self.lock_state();
        if !state.stats_loaded {
            return None;
        }
        state
            .achievements
            .get(name)
            .map(|a| (a.unlocked, a.unlock_time))
    }

    fn achievement_display_attribute(&self, name: &str, key: &str) -> Option<String> {
        let state = self.lock_state();
        let achievement = state.achievements.get(name)?;
        match key {
            "name" => Some(achievement.title.clone()),
            "desc" => Some(achievement.description.clone()),
            "hidden" => Some(if achievement.hidden { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    fn indicate_achievement_progress(&self, name: &str, current: u32, max: u32) -> bool {
        let state = self.lock_state();
        let known_and_locked = state
            .achievements
            .get(name)
            .is_some_and(|a| !a.unlocked);
        if !state.stats_loaded || !known_and_locked || current >= max {
            return false;
        }
        drop(state);

        self.push_callback(RawCallback::UserAchievementStored {
            game_id: self.game_id(),
            group_achievement: false,
            achievement_name: name.to_string(),
            current_progress: current,
            max_progress: max,
        });
        true
    }

    fn set_stat_i32(&self, name: &str, value: i32) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }
        match state.int_stats.get_mut(name) {
            Some(stat) => {
                *stat = value;
                true
            }
            None => false,
        }
    }

    fn set_stat_f32(&self, name: &str, value: f32) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }
        match state.float_stats.get_mut(name) {
            Some(stat) => {
                *stat = value;
                true
            }
            None => false,
        }
    }

    fn stat_i32(&self, name: &str) -> Option<i32> {
        let state = self.lock_state();
        if !state.stats_loaded {
            return None;
        }
        state.int_stats.get(name).copied()
    }

    fn stat_f32(&self, name: &str) -> Option<f32> {
        let state = self.lock_state();
        if !state.stats_loaded {
            return None;
        }
        state.float_stats.get(name).copied()
    }

    fn reset_all_stats(&self, achievements_too: bool) -> bool {
        let mut state = self.lock_state();
        if !state.stats_loaded {
            return false;
        }

        state.int_stats.values_mut().for_each(|v| *v = 0);
        state.float_stats.values_mut().for_each(|v| *v = 0.0);
        if achievements_too {
            for achievement in state.achievements.values_mut() {
                achievement.unlocked = false;
                achievement.unlock_time = 0;
                achievement.stored = false;
            }
        }

        self.queue_store(&mut state);
        true
    }
}

impl FriendsApi for SimulatedSteam {
    fn set_rich_presence(&self, key: &str, value: &str) -> bool {
        if key.is_empty()
            || key.len() >= MAX_RICH_PRESENCE_KEY_LENGTH
            || value.len() >= MAX_RICH_PRESENCE_VALUE_LENGTH
        {
            return false;
        }

        let mut state = self.lock_state();
        if value.is_empty() {
            state.presence.shift_remove(key);
            return true;
        }
        if !state.presence.contains_key(key) && state.presence.len() >= MAX_RICH_PRESENCE_KEYS {
            return false;
        }
        state.presence.insert(key.to_string(), value.to_string());
        true
    }

    fn clear_rich_presence(&self) {
        self.lock_state().presence.clear();
    }
}

impl UtilsApi for SimulatedSteam {
    fn app_id(&self) -> AppId {
        self.app_id
    }

    fn game_id(&self) -> GameId {
        GameId::from(self.app_id)
    }

    fn steam_id(&self) -> SteamId {
        self.user
    }

    fn current_game_language(&self) -> String {
        self.language.clone()
    }
}

impl OverlayApi for SimulatedSteam {
    fn activate_game_overlay(&self, dialog: OverlayDialog) {
        self.lock_state()
            .overlay_history
            .push(dialog.as_str().to_string());
    }

    fn activate_game_overlay_to_web_page(&self, url: &str) {
        self.lock_state().overlay_history.push(url.to_string());
    }

    fn is_overlay_enabled(&self) -> bool {
        self.overlay_enabled.load(Ordering::SeqCst)
    }
}
