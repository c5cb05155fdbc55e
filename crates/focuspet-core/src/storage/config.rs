//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default session lengths, also used when front-end input is invalid
//! - Stage growth thresholds
//! - Companion neglect threshold and polling cadence
//!
//! Configuration is stored at `<data dir>/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::error::ConfigError;
use crate::progress::GrowthThresholds;
use crate::session::duration_from_minutes;

const CONFIG_FILE: &str = "config.toml";

/// Session lengths used when the caller supplies none, or supplies garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: f64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: f64,
    #[serde(default = "default_total_cycles")]
    pub total_cycles: u32,
}

/// Companion behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Minutes without interaction before the companion shows as sad.
    #[serde(default = "default_neglect_minutes")]
    pub neglect_minutes: f64,
    /// Polling cadence for front-ends driving `tick`.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionDefaults,
    #[serde(default)]
    pub growth: GrowthThresholds,
    #[serde(default)]
    pub companion: CompanionConfig,
}

// Default functions
fn default_focus_minutes() -> f64 {
    25.0
}
fn default_break_minutes() -> f64 {
    5.0
}
fn default_total_cycles() -> u32 {
    3
}
fn default_neglect_minutes() -> f64 {
    60.0
}
fn default_tick_ms() -> u64 {
    200
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
            total_cycles: default_total_cycles(),
        }
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            neglect_minutes: default_neglect_minutes(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl CompanionConfig {
    /// Neglect threshold; a non-positive or unrepresentable setting uses the default.
    pub fn neglect_threshold(&self) -> Duration {
        let configured = Some(self.neglect_minutes)
            .filter(|m| *m > 0.0)
            .and_then(duration_from_minutes);
        configured.unwrap_or_else(|| {
            tracing::warn!(neglect_minutes = self.neglect_minutes, "invalid neglect threshold, using default");
            Duration::minutes(default_neglect_minutes() as i64)
        })
    }

    /// Polling cadence clamped to 100..=250 ms.
    pub fn tick_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.tick_ms.clamp(100, 250))
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

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(n) if n.is_u64() => {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                serde_json::Value::Number(parsed.into())
            }
            serde_json::Value::Number(_) => {
                let parsed = value
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Number::from_f64(parsed)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("not a leaf value".to_string()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load from `dir`, writing defaults if no file exists yet.
    ///
    /// Never fails: an unreadable or unparseable file yields defaults and is
    /// left on disk as it was.
    pub fn load(dir: &Path) -> Self {
        let path = Self::path(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                if let Err(e) = cfg.save(dir) {
                    tracing::warn!(error = %e, "could not write default config");
                }
                cfg
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                Self::default()
            }
        }
    }

    /// Persist to `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = Self::path(dir);
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::create_dir_all(dir).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf key with its current value, in document order.
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
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[growth]\nbaby_threshold = 0.1\n").unwrap();
        assert_eq!(parsed.growth.baby_threshold, 0.1);
        assert_eq!(parsed.growth.teen_threshold, 360.0);
        assert_eq!(parsed.session.total_cycles, 3);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.total_cycles").as_deref(), Some("3"));
        assert_eq!(cfg.get("growth.teen_threshold").as_deref(), Some("360.0"));
        assert!(cfg.get("session.missing_key").is_none());
        assert!(cfg.get("session").is_none());
    }

    #[test]
    fn set_updates_float_and_integer() {
        let mut cfg = Config::default();
        cfg.set("growth.baby_threshold", "0.3").unwrap();
        cfg.set("session.total_cycles", "5").unwrap();
        assert_eq!(cfg.growth.baby_threshold, 0.3);
        assert_eq!(cfg.session.total_cycles, 5);
    }

    #[test]
    fn set_float_field_accepts_integer_text() {
        let mut cfg = Config::default();
        cfg.set("companion.neglect_minutes", "30").unwrap();
        assert_eq!(cfg.companion.neglect_minutes, 30.0);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("growth.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.total_cycles", "three").is_err());
        assert!(cfg.set("session.total_cycles", "1.5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path());
        assert_eq!(cfg, Config::default());
        assert!(Config::path(dir.path()).exists());
    }

    #[test]
    fn load_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path(dir.path()), "session = [[[").unwrap();
        assert_eq!(Config::load(dir.path()), Config::default());
    }

    #[test]
    fn load_leaves_unreadable_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::path(dir.path());
        let bytes = b"[session]\nfocus_minutes = \xff\xfe\n";
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(Config::load(dir.path()), Config::default());
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn neglect_threshold_handles_extreme_values() {
        let mut c = CompanionConfig::default();
        c.neglect_minutes = 1e300;
        assert_eq!(c.neglect_threshold(), Duration::minutes(60));
        c.neglect_minutes = -5.0;
        assert_eq!(c.neglect_threshold(), Duration::minutes(60));
        c.neglect_minutes = 0.5;
        assert_eq!(c.neglect_threshold(), Duration::seconds(30));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.set("companion.tick_ms", "150").unwrap();
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).companion.tick_ms, 150);
    }

    #[test]
    fn tick_interval_is_clamped() {
        let mut c = CompanionConfig::default();
        c.tick_ms = 5;
        assert_eq!(c.tick_interval(), StdDuration::from_millis(100));
        c.tick_ms = 1000;
        assert_eq!(c.tick_interval(), StdDuration::from_millis(250));
    }

    #[test]
    fn entries_lists_leaf_keys() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"session.focus_minutes".to_string()));
        assert!(keys.contains(&"companion.tick_ms".to_string()));
    }
}
