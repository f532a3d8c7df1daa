use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section of the key-value store holding the achievement table
pub const ACHIEVEMENT_SECTION: &str = "OnlineSubsystemSteam";

/// Subsystem settings from `Online Settings.yaml`
///
/// Every field has a default so a partial (or missing) file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemSettings {
    /// Steam app id of the running game (0 = let the SDK decide)
    #[serde(default)]
    pub app_id: u32,

    /// Sleep between worker-thread polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_true")]
    pub initialize_at_startup: bool,

    /// Relaunch through the Steam client when started outside of it
    #[serde(default)]
    pub require_relaunch: bool,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Write log files as one JSON object per line
    #[serde(default)]
    pub json_logs: bool,

    /// Path of the loaded SDK library, hashed and logged at startup when set
    #[serde(default)]
    pub sdk_library_path: Option<String>,
}

impl Default for SubsystemSettings {
    fn default() -> Self {
        Self {
            app_id: 0,
            poll_interval_ms: default_poll_interval_ms(),
            initialize_at_startup: true,
            require_relaunch: false,
            debug_mode: false,
            log_dir: default_log_dir(),
            json_logs: false,
            sdk_library_path: None,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Flat key-value store, grouped by section, as found in engine ini-style
/// configuration (`[Section] Key=Value`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueStore {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` for missing sections, missing keys and empty values
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn section_len(&self, section: &str) -> usize {
        self.sections.get(section).map_or(0, IndexMap::len)
    }
}

/// One achievement declared in configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementConfig {
    pub name: String,
}

impl AchievementConfig {
    pub fn to_debug_string(&self) -> String {
        format!("Achievement:{{{}}}", self.name)
    }
}

/// Key under which the N-th achievement id is stored
pub fn achievement_key(index: usize) -> String {
    format!("Achievement_{}_Id", index)
}

/// Read `Achievement_<N>_Id` keys from N = 0 until the first missing one.
pub fn read_achievements(store: &KeyValueStore) -> Vec<AchievementConfig> {
    (0..)
        .map_while(|index| store.get(ACHIEVEMENT_SECTION, &achievement_key(index)))
        .map(|name| AchievementConfig {
            name: name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = SubsystemSettings::default();
        assert_eq!(settings.poll_interval_ms, 5);
        assert!(settings.initialize_at_startup);
        assert!(!settings.require_relaunch);
        assert_eq!(settings.log_dir, "logs");
        assert!(!settings.json_logs);
        assert!(settings.sdk_library_path.is_none());
    }

    #[test]
    fn test_read_achievements_stops_at_gap() {
        let mut store = KeyValueStore::new();
        store.set(ACHIEVEMENT_SECTION, achievement_key(0), "ACH_WIN_ONE_GAME");
        store.set(ACHIEVEMENT_SECTION, achievement_key(1), "ACH_TRAVEL_FAR");
        store.set(ACHIEVEMENT_SECTION, achievement_key(3), "ACH_UNREACHABLE");

        let achievements = read_achievements(&store);
        let names: Vec<&str> = achievements.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ACH_WIN_ONE_GAME", "ACH_TRAVEL_FAR"]);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut store = KeyValueStore::new();
        store.set(ACHIEVEMENT_SECTION, achievement_key(0), "");
        store.set(ACHIEVEMENT_SECTION, achievement_key(1), "ACH_TRAVEL_FAR");

        assert!(read_achievements(&store).is_empty());
    }

    #[test]
    fn test_achievement_debug_string() {
        let config = AchievementConfig {
            name: "ACH_WIN_ONE_GAME".to_string(),
        };
        assert_eq!(config.to_debug_string(), "Achievement:{ACH_WIN_ONE_GAME}");
    }
}
