//! TOML-based application configuration.
//!
//! Stores the user's session preferences (language, rhythm, noise, guide,
//! timer and meditation toggles) and the audio settings the controller is
//! built with.
//!
//! Configuration is stored at `~/.config/quietsleep/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::audio::{Language, CUE_VOLUME};
use crate::error::ConfigError;
use crate::noise::{NoiseKind, NoiseRequest, DEFAULT_BUFFER_SECS, DEFAULT_SAMPLE_RATE};
use crate::rhythm::{self, Rhythm, CUSTOM_MAX_SECS, CUSTOM_MIN_SECS, CUSTOM_RHYTHM_ID};
use crate::session::{ControllerSettings, SessionOptions};

/// Persisted session preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_rhythm_id")]
    pub rhythm_id: String,
    #[serde(default)]
    pub custom_rhythm: Rhythm,
    #[serde(default = "default_noise_type")]
    pub noise_type: NoiseKind,
    #[serde(default)]
    pub noise_enabled: bool,
    #[serde(default)]
    pub guide_enabled: bool,
    /// Noise gain in `[0, 1]`.
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub timer_enabled: bool,
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u32,
    #[serde(default)]
    pub meditation_enabled: bool,
}

/// Audio parameters handed to the session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_noise_buffer_secs")]
    pub noise_buffer_secs: f64,
    #[serde(default = "default_cue_volume")]
    pub cue_volume: f64,
    /// Directory holding the `audio/` assets.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/quietsleep/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub audio: AudioConfig,
}

fn default_theme() -> String {
    "system".into()
}
fn default_rhythm_id() -> String {
    rhythm::PRESETS[0].id.into()
}
fn default_noise_type() -> NoiseKind {
    NoiseKind::White
}
fn default_volume() -> f64 {
    0.2
}
fn default_timer_minutes() -> u32 {
    30
}
fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}
fn default_noise_buffer_secs() -> f64 {
    f64::from(DEFAULT_BUFFER_SECS)
}
fn default_cue_volume() -> f64 {
    f64::from(CUE_VOLUME)
}
fn default_asset_root() -> String {
    ".".into()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::default(),
            theme: default_theme(),
            rhythm_id: default_rhythm_id(),
            custom_rhythm: Rhythm::default(),
            noise_type: default_noise_type(),
            noise_enabled: false,
            guide_enabled: false,
            volume: default_volume(),
            timer_enabled: false,
            timer_minutes: default_timer_minutes(),
            meditation_enabled: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            noise_buffer_secs: default_noise_buffer_secs(),
            cue_volume: default_cue_volume(),
            asset_root: default_asset_root(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Flattened `key = value` pairs for every leaf.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type or range.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate().map_err(invalid)?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), String> {
        let p = &self.preferences;
        if !(0.0..=1.0).contains(&p.volume) {
            return Err(format!("volume must be within 0..=1 (got {})", p.volume));
        }
        if p.timer_minutes == 0 {
            return Err("timer_minutes must be positive".into());
        }
        if p.rhythm_id != CUSTOM_RHYTHM_ID && rhythm::preset(&p.rhythm_id).is_none() {
            return Err(format!("unknown rhythm: {}", p.rhythm_id));
        }
        let r = p.custom_rhythm;
        for secs in [r.inhale_secs, r.hold_secs, r.exhale_secs] {
            if !(CUSTOM_MIN_SECS..=CUSTOM_MAX_SECS).contains(&secs) {
                return Err(format!(
                    "custom rhythm phases must be {CUSTOM_MIN_SECS}..={CUSTOM_MAX_SECS} seconds (got {secs})"
                ));
            }
        }
        let a = &self.audio;
        if a.sample_rate == 0 {
            return Err("sample_rate must be positive".into());
        }
        if a.noise_buffer_secs.is_nan() || a.noise_buffer_secs <= 0.0 {
            return Err("noise_buffer_secs must be positive".into());
        }
        if !(0.0..=1.0).contains(&a.cue_volume) {
            return Err(format!("cue_volume must be within 0..=1 (got {})", a.cue_volume));
        }
        Ok(())
    }

    /// Session options as the preferences describe them.
    pub fn session_options(&self) -> SessionOptions {
        let p = &self.preferences;
        SessionOptions {
            rhythm: rhythm::resolve(&p.rhythm_id, p.custom_rhythm),
            noise: p
                .noise_enabled
                .then(|| NoiseRequest::new(p.noise_type, p.volume as f32)),
            timer_minutes: p.timer_enabled.then_some(p.timer_minutes),
            guide_enabled: p.guide_enabled,
            language: p.language,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            sample_rate: self.audio.sample_rate,
            noise_buffer_secs: self.audio.noise_buffer_secs as f32,
            cue_volume: self.audio.cue_volume as f32,
            asset_root: PathBuf::from(&self.audio.asset_root),
            noise_seed: None,
        }
    }
}
