// Subsystem facade
//
// Single entry point for the game: owns the task manager (and through it the
// worker thread) plus the three interfaces. Explicitly constructed and owned
// by the caller; all methods run on the game thread.

use crate::error::{OnlineError, OnlineResult};
use crate::interfaces::{ExternalUi, Presence, StatsAndAchievements};
use crate::metrics::PipelineMetrics;
use crate::models::{AchievementConfig, AppId, SubsystemSettings};
use crate::sdk::SteamSdk;
use crate::tasks::AsyncTaskManager;
use anyhow::Context;
use camino::Utf8Path;
use sha1::{Digest, Sha1};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

pub struct SteamSubsystem {
    sdk: Arc<dyn SteamSdk>,
    settings: SubsystemSettings,
    achievements: Vec<AchievementConfig>,
    metrics: Arc<PipelineMetrics>,

    /// Present exactly while initialized
    task_manager: Option<AsyncTaskManager>,

    stats_and_achievements: Option<StatsAndAchievements>,
    presence: Option<Presence>,
    external_ui: Option<ExternalUi>,
}

impl SteamSubsystem {
    pub fn new(
        sdk: Arc<dyn SteamSdk>,
        settings: SubsystemSettings,
        achievements: Vec<AchievementConfig>,
    ) -> Self {
        Self {
            sdk,
            settings,
            achievements,
            metrics: Arc::new(PipelineMetrics::new()),
            task_manager: None,
            stats_and_achievements: None,
            presence: None,
            external_ui: None,
        }
    }

    /// Start the worker thread and create the interfaces
    ///
    /// Does nothing if already initialized.
    pub fn initialize(&mut self) -> OnlineResult<()> {
        if self.task_manager.is_some() {
            return Ok(());
        }

        tracing::info!("Initialize");
        if !self.sdk.init() {
            tracing::error!("Initialize: failed to initialize the Steam API");
            return Err(OnlineError::SdkUnavailable("SteamAPI"));
        }

        let mut task_manager = AsyncTaskManager::new(Arc::clone(&self.sdk), Arc::clone(&self.metrics));
        task_manager
            .start(self.poll_interval())
            .map_err(|e| OnlineError::CallFailed(format!("spawn worker thread: {}", e)))?;
        if let Some(thread_id) = task_manager.worker_thread_id() {
            tracing::debug!("Created worker thread ({:?})", thread_id);
        }
        self.task_manager = Some(task_manager);

        self.stats_and_achievements = Some(StatsAndAchievements::new(
            Arc::clone(&self.sdk),
            self.achievements.clone(),
        ));
        self.presence = Some(Presence::new(Arc::clone(&self.sdk)));
        self.external_ui = Some(ExternalUi::new(Arc::clone(&self.sdk)));

        Ok(())
    }

    /// Drop the interfaces and stop the worker thread
    ///
    /// Events still queued are discarded. Safe to call at any time.
    pub fn shutdown(&mut self) {
        self.stats_and_achievements = None;
        self.presence = None;
        self.external_ui = None;

        let Some(mut task_manager) = self.task_manager.take() else {
            return;
        };

        tracing::info!("Shutdown");
        task_manager.shutdown();
        let discarded = task_manager.pending();
        if discarded > 0 {
            tracing::debug!("Discarding {} undelivered events", discarded);
        }
        drop(task_manager);

        self.sdk.shutdown();
    }

    /// Per-frame update on the game thread
    ///
    /// Retries initialization until it succeeds, then dispatches every queued
    /// event. Returns the number of events dispatched.
    pub fn tick(&mut self, _delta: Duration) -> usize {
        if self.task_manager.is_none() {
            if let Err(e) = self.initialize() {
                tracing::trace!("Tick: not initialized yet: {}", e);
                return 0;
            }
        }

        match (
            self.task_manager.as_mut(),
            self.stats_and_achievements.as_mut(),
        ) {
            (Some(task_manager), Some(stats)) => task_manager.game_tick(stats),
            _ => 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sdk.is_enabled()
    }

    pub fn is_initialized(&self) -> bool {
        self.task_manager.is_some()
    }

    /// App id reported by the SDK, 0 when unavailable
    pub fn app_id(&self) -> AppId {
        self.sdk
            .utils()
            .map(|utils| utils.app_id())
            .unwrap_or_default()
    }

    pub fn app_id_string(&self) -> String {
        self.app_id().to_string()
    }

    pub fn current_game_language(&self) -> OnlineResult<String> {
        self.sdk
            .utils()
            .map(|utils| utils.current_game_language())
            .ok_or(OnlineError::SdkUnavailable("ISteamApps"))
    }

    /// True when the game was relaunched through the Steam client and this
    /// process must exit
    pub fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        if app_id.raw() != 0 && self.sdk.restart_app_if_necessary(app_id) {
            tracing::info!("Game restarting within Steam client, exiting");
            return true;
        }
        false
    }

    /// Lowercase hex SHA-1 of the SDK library at `path`
    ///
    /// Lets a game compare the loaded library against the one it shipped with.
    pub fn sdk_library_sha1(&self, path: &Utf8Path) -> anyhow::Result<String> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read SDK library: {}", path))?;
        let mut hasher = Sha1::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());
        tracing::debug!("SDK library {} SHA-1 = {}", path, hash);
        Ok(hash)
    }

    pub fn settings(&self) -> &SubsystemSettings {
        &self.settings
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.poll_interval_ms)
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn task_manager(&self) -> Option<&AsyncTaskManager> {
        self.task_manager.as_ref()
    }

    pub fn stats_and_achievements(&self) -> Option<&StatsAndAchievements> {
        self.stats_and_achievements.as_ref()
    }

    pub fn stats_and_achievements_mut(&mut self) -> Option<&mut StatsAndAchievements> {
        self.stats_and_achievements.as_mut()
    }

    pub fn presence(&self) -> Option<&Presence> {
        self.presence.as_ref()
    }

    pub fn external_ui(&self) -> Option<&ExternalUi> {
        self.external_ui.as_ref()
    }
}

impl Drop for SteamSubsystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
