//! Configuration loading for mouse-tracker.
//!
//! The recorder reads a TOML file from the platform config directory, or
//! from an explicit path. The file is never written; a missing default
//! file means built-in defaults.

use crate::{
    AppError, AppResult,
    config::{HotkeyConfig, LoggingConfig, OutputConfig, RecordingConfig},
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Recorder configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Session shape and sampling parameters.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Where trajectories are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Toggle hotkey.
    #[serde(default)]
    pub hotkey: HotkeyConfig,
    /// Optional log file.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load the configuration.
    ///
    /// With `explicit`, that file must exist. Without it, the platform
    /// config file is read if present and defaults are used otherwise.
    #[track_caller]
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::ConfigError {
                        reason: format!("Config file not found: {:?}", path),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                path.to_path_buf()
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    info!("No config found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config {:?}: {}", config_path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = Self::from_toml(&contents)?;

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Parse a configuration from TOML text. Absent sections and keys take
    /// their defaults.
    #[track_caller]
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Platform location of the config file, e.g.
    /// `~/.config/mouse-tracker/config.toml` on Linux.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mouse-tracker", "Mouse-Tracker")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
