use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use crate::core::PreferencesError;

/// Preference keys.
pub mod keys {
    pub const AUTO_PLAY: &str = "AUTO_PLAY";
    pub const DEFAULT_VOLUME: &str = "DEFAULT_VOLUME";
    pub const SEEK_SENSITIVITY: &str = "SEEK_SENSITIVITY";
    pub const HIDE_DELAY: &str = "HIDE_DELAY";
    pub const THEME: &str = "THEME";
}

/// Persisted key/value preferences.
///
/// Writes only touch memory; nothing reaches disk until [`Preferences::flush`].
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    values: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl Preferences {
    /// Loads from the per-user config directory.
    pub fn load() -> Self {
        Self::load_from(Self::preferences_path())
    }

    /// Loads from `path`, falling back to empty preferences if the file is
    /// missing or unreadable. The path is kept for later flushes either way.
    pub fn load_from(path: PathBuf) -> Self {
        let values = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                    Ok(values) => {
                        log::info!("Loaded preferences from {}", path.display());
                        values
                    }
                    Err(e) => {
                        log::warn!("Preferences file {} is corrupt ({}), using defaults", path.display(), e);
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read preferences at {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            log::info!("No preferences file at {}, using defaults", path.display());
            BTreeMap::new()
        };

        Self { values, path: Some(path) }
    }

    /// Preferences that are never written anywhere.
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn preferences_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dog-player")
            .join("preferences.json")
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Decodes a structured value; `None` when missing or of the wrong shape.
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn put_double(&mut self, key: &str, value: f64) {
        // NaN has no JSON form
        if value.is_finite() {
            self.values.insert(key.to_string(), Value::from(value));
        }
    }

    pub fn put_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn put_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn put_value<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(encoded) => {
                self.values.insert(key.to_string(), encoded);
            }
            Err(e) => log::warn!("Failed to encode preference {}: {}", key, e),
        }
    }

    /// Writes every value to disk. In-memory preferences flush to nowhere.
    pub fn flush(&self) -> Result<(), PreferencesError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&self.values)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
        };
        write().map_err(|source| PreferencesError::Write { path: path.clone(), source })?;

        log::info!("Saved preferences to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
    EyeCare,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::EyeCare];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::EyeCare => "Eye care",
        }
    }
}

/// Typed snapshot of the player preferences, clamped to their valid ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub auto_play: bool,
    pub default_volume: f64,
    /// Persisted and shown in the settings panel; seeking does not read it.
    pub seek_sensitivity: i64,
    pub hide_delay_secs: i64,
    pub theme: Theme,
}

impl PlayerSettings {
    pub const SEEK_SENSITIVITY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;
    pub const HIDE_DELAY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

    pub fn from_preferences(prefs: &Preferences) -> Self {
        let defaults = Self::default();
        Self {
            auto_play: prefs.get_bool(keys::AUTO_PLAY, defaults.auto_play),
            default_volume: prefs
                .get_double(keys::DEFAULT_VOLUME, defaults.default_volume)
                .clamp(0.0, 1.0),
            seek_sensitivity: prefs
                .get_int(keys::SEEK_SENSITIVITY, defaults.seek_sensitivity)
                .clamp(*Self::SEEK_SENSITIVITY_RANGE.start(), *Self::SEEK_SENSITIVITY_RANGE.end()),
            hide_delay_secs: prefs
                .get_int(keys::HIDE_DELAY, defaults.hide_delay_secs)
                .clamp(*Self::HIDE_DELAY_RANGE.start(), *Self::HIDE_DELAY_RANGE.end()),
            theme: prefs.get_value(keys::THEME).unwrap_or(defaults.theme),
        }
    }

    pub fn write_to(&self, prefs: &mut Preferences) {
        prefs.put_bool(keys::AUTO_PLAY, self.auto_play);
        prefs.put_double(keys::DEFAULT_VOLUME, self.default_volume);
        prefs.put_int(keys::SEEK_SENSITIVITY, self.seek_sensitivity);
        prefs.put_int(keys::HIDE_DELAY, self.hide_delay_secs);
        prefs.put_value(keys::THEME, &self.theme);
    }

    pub fn hide_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.hide_delay_secs as u64)
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            auto_play: false,
            default_volume: 0.5,
            seek_sensitivity: 3,
            hide_delay_secs: 3,
            theme: Theme::Dark,
        }
    }
}
