use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detection::Side;
use crate::error::ConfigError;

/// Display names of both sides, used in chat messages and summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideNames {
    pub zeon: String,
    pub federation: String,
}

impl SideNames {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Zeon => &self.zeon,
            Side::Federation => &self.federation,
        }
    }
}

impl Default for SideNames {
    fn default() -> Self {
        Self {
            zeon: "自護".to_string(),
            federation: "連邦".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Time between two sampling cycles
    pub sample_interval_ms: u64,

    /// Debounce window after the last detection before classifying
    pub clear_delay_ms: u64,

    /// Inactivity after which an active streak is dropped
    pub streak_reset_threshold_secs: u64,

    /// Prefix of the recognized text that marks a player as down
    pub end_marker: String,

    /// Capture device name (virtual camera)
    pub video_device: String,

    /// ffmpeg executable
    pub ffmpeg_path: String,

    /// Longest a single frame capture may run before ffmpeg is killed
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,

    /// Tesseract data directory, system default when unset
    #[serde(default)]
    pub tessdata_path: Option<String>,

    /// Display names of both sides
    #[serde(default)]
    pub side_names: SideNames,

    /// Announce the time and totals every hour in the evening
    #[serde(default = "default_true")]
    pub hourly_announcements: bool,

    /// Sponsors credited in hourly announcements
    #[serde(default = "default_sponsors")]
    pub sponsors: Vec<String>,
}

fn default_capture_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_sponsors() -> Vec<String> {
    vec!["飛藝洋服".to_string(), "Element of Stage".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            clear_delay_ms: 2000,
            streak_reset_threshold_secs: 360, // 6 minutes
            end_marker: "GAMEOVER".to_string(),
            video_device: "OBS Virtual Camera".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            capture_timeout_ms: default_capture_timeout_ms(),
            tessdata_path: None,
            side_names: SideNames::default(),
            hourly_announcements: true,
            sponsors: default_sponsors(),
        }
    }
}

impl Config {
    /// Load configuration from the directory next to the executable.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            tracing::info!("✓ Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            tracing::info!("✓ Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_err = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_err(Box::new(e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_err(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_err(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_err(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_err(Box::new(e)))?;

        Ok(())
    }

    /// Reject settings the poller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid("sample_interval_ms must be positive".into()));
        }
        if self.clear_delay_ms == 0 {
            return Err(ConfigError::Invalid("clear_delay_ms must be positive".into()));
        }
        if self.capture_timeout_ms == 0 {
            return Err(ConfigError::Invalid("capture_timeout_ms must be positive".into()));
        }
        if self.end_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("end_marker must not be empty".into()));
        }
        Ok(())
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|_| ConfigError::NoConfigDir)?;
        let exe_dir = exe_path.parent().ok_or(ConfigError::NoConfigDir)?;

        Ok(exe_dir.join("config").join("config.json"))
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn streak_reset_threshold(&self) -> Duration {
        Duration::from_secs(self.streak_reset_threshold_secs)
    }
}
