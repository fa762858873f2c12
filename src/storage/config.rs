//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory; a missing file
//! yields defaults.

use crate::audio::AudioConfig;
use crate::workouts::library::DEFAULT_ROUNDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Cue settings
    pub audio: AudioConfig,
    /// Workout settings
    pub workout: WorkoutSettings,
    /// Display settings
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            audio: AudioConfig::default(),
            workout: WorkoutSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

/// Workout-related settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutSettings {
    /// Rounds for the built-in workout
    pub total_rounds: u32,
    /// Hold the first tick until the countdown cue has played
    pub lead_in_with_countdown: bool,
    /// JSON plan to run instead of the built-in workout
    pub workout_file: Option<PathBuf>,
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_ROUNDS,
            lead_in_with_countdown: true,
            workout_file: None,
        }
    }
}

/// Display-related settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Hold a screen wake lock while a workout runs
    pub keep_screen_awake: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            keep_screen_awake: true,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "intervaltimer", "IntervalTimer")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let data_dir = get_data_dir();
    let mut config = load_config_from(&get_config_path())?;

    // Relative sound directories live under the data directory.
    if config.audio.sound_dir.is_relative() {
        config.audio.sound_dir = data_dir.join(&config.audio.sound_dir);
    }
    config.data_dir = data_dir;

    Ok(config)
}

/// Load configuration from a specific file. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to a specific file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
