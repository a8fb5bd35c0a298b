//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Break durations offered on the interruption overlay
//! - Notification/sound behavior
//! - Default monitoring profile
//!
//! Configuration is stored at `~/.config/focusguard/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::coordinator::Profile;
use crate::error::ConfigError;

/// Break option configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreaksConfig {
    /// Durations (minutes) offered when an interruption fires.
    #[serde(default = "default_break_durations")]
    pub durations_min: Vec<u32>,
}

impl Default for BreaksConfig {
    fn default() -> Self {
        Self {
            durations_min: default_break_durations(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Play system sounds on break start/finish.
    #[serde(default = "default_true")]
    pub sounds: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sounds: true,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusguard/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub breaks: BreaksConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Profile preselected on the home screen.
    #[serde(default = "default_profile")]
    pub default_profile: Profile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            breaks: BreaksConfig::default(),
            notifications: NotificationsConfig::default(),
            default_profile: default_profile(),
        }
    }
}

fn default_break_durations() -> Vec<u32> {
    vec![5, 10, 15]
}
fn default_true() -> bool {
    true
}
fn default_profile() -> Profile {
    Profile::Alert
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/focusguard"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// is missing or unreadable. A corrupt file never blocks startup.
    pub fn load() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "config parse failed; using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// String access for the CLI's `config get`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "breaks.durations_min" => Some(
                self.breaks
                    .durations_min
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            "notifications.sounds" => Some(self.notifications.sounds.to_string()),
            "default_profile" => Some(
                match self.default_profile {
                    Profile::Alert => "alert",
                    Profile::Quiet => "quiet",
                }
                .to_string(),
            ),
            _ => None,
        }
    }

    /// String access for the CLI's `config set`. Saves on success.
    ///
    /// # Errors
    /// `UnknownKey` for an unrecognized key, `InvalidValue` when the
    /// value does not parse, or a save failure.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "breaks.durations_min" => {
                let parsed: Result<Vec<u32>, _> =
                    value.split(',').map(|v| v.trim().parse()).collect();
                self.breaks.durations_min = parsed.map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("expected comma-separated minutes, got '{value}'"),
                })?;
            }
            "notifications.enabled" => {
                self.notifications.enabled = parse_bool(key, value)?;
            }
            "notifications.sounds" => {
                self.notifications.sounds = parse_bool(key, value)?;
            }
            "default_profile" => {
                self.default_profile = match value {
                    "alert" => Profile::Alert,
                    "quiet" => Profile::Quiet,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: format!("expected 'alert' or 'quiet', got '{value}'"),
                        })
                    }
                };
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected true/false, got '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_offer_three_break_options() {
        let config = Config::default();
        assert_eq!(config.breaks.durations_min, vec![5, 10, 15]);
        assert!(config.notifications.enabled);
        assert_eq!(config.default_profile, Profile::Alert);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.breaks.durations_min = vec![3, 7];
        config.default_profile = Profile::Quiet;
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str("[breaks]\ndurations_min = [20]\n").unwrap();
        assert_eq!(config.breaks.durations_min, vec![20]);
        assert!(config.notifications.sounds);
    }

    #[test]
    fn get_and_set_string_keys() {
        let mut config = Config::default();
        assert_eq!(
            config.get("breaks.durations_min").as_deref(),
            Some("5,10,15")
        );
        assert_eq!(config.get("bogus"), None);
        // set() persists, so only exercise the parse failure path here.
        let err = config.set("default_profile", "loud").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = config.set("nope", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }
}
