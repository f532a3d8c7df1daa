use crate::models::{AchievementConfig, KeyValueStore, SubsystemSettings, read_achievements};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Prefix of environment variables overriding settings (`STEAM_ASYNC_APP_ID=480`)
pub const ENV_PREFIX: &str = "STEAM_ASYNC";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two configuration files:
/// - Settings (`Online Settings.yaml`): app id, worker poll interval, logging
/// - Achievements (`Achievements.yaml`): key-value store holding the achievement table
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    achievements_path: Utf8PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "Online Data")
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("Online Settings.yaml"),
            achievements_path: config_dir.join("Achievements.yaml"),
            config_dir,
            env_prefix: ENV_PREFIX.to_string(),
        })
    }

    /// Read environment overrides from `<prefix>_*` instead of `STEAM_ASYNC_*`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load subsystem settings.
    ///
    /// Layers, lowest priority first: built-in defaults, the settings file
    /// (optional), environment variables.
    pub fn load_settings(&self) -> Result<SubsystemSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let settings: SubsystemSettings = Config::builder()
            .add_source(
                File::from(self.settings_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings (app_id={})", settings.app_id);
        Ok(settings)
    }

    /// Save subsystem settings.
    pub fn save_settings(&self, settings: &SubsystemSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the achievement key-value store.
    ///
    /// # Returns
    /// The loaded store, or an empty one if the file doesn't exist
    pub fn load_achievements(&self) -> Result<KeyValueStore> {
        if !self.achievements_path.exists() {
            tracing::warn!(
                "Achievements file not found at {}, no achievements configured",
                self.achievements_path
            );
            return Ok(KeyValueStore::new());
        }

        let file_contents = fs::read_to_string(&self.achievements_path).with_context(|| {
            format!("Failed to read achievements: {}", self.achievements_path)
        })?;

        let store: KeyValueStore = serde_yaml_ng::from_str(&file_contents).with_context(|| {
            format!("Failed to parse achievements: {}", self.achievements_path)
        })?;

        tracing::info!("Loaded achievements from {}", self.achievements_path);
        Ok(store)
    }

    /// Save the achievement key-value store.
    pub fn save_achievements(&self, store: &KeyValueStore) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(store)
            .context("Failed to serialize achievements to YAML")?;

        fs::write(&self.achievements_path, yaml_string).with_context(|| {
            format!("Failed to write achievements: {}", self.achievements_path)
        })?;

        tracing::info!("Saved achievements to {}", self.achievements_path);
        Ok(())
    }

    /// Achievement table read from the store in `Achievements.yaml`
    pub fn load_achievement_configs(&self) -> Result<Vec<AchievementConfig>> {
        let achievements = read_achievements(&self.load_achievements()?);
        tracing::info!("{} achievements configured", achievements.len());
        Ok(achievements)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn achievements_path(&self) -> &Utf8Path {
        &self.achievements_path
    }
}
