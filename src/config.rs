//! Game configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Countdown per image, in seconds.
    pub round_seconds: u64,
    /// Bonus awarded for submitting instantly.
    pub max_time_bonus: u32,
    /// Show the ground truth once a round is submitted.
    pub reveal_on_submit: bool,
    pub window_size: [f32; 2],
    pub log_level: LogLevel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 60,
            max_time_bonus: 25,
            reveal_on_submit: true,
            window_size: [1280.0, 860.0],
            log_level: LogLevel::Info,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
