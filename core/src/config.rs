//! Configuration management
//!
//! Handles loading, saving, and providing defaults for engine settings.
//! Settings are stored in TOML format in the platform-specific config
//! directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration.
///
/// Contains all tunable settings organized into sections. Serialized
/// to/from TOML format for persistence; missing sections and fields fall
/// back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MocapConfig {
    /// Capture worker settings
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Log storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Capture worker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Sampling cadence of the capture worker in milliseconds
    /// (default: 50, one simulation tick)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl CaptureConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

/// Log storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory capture logs are saved to; `None` uses the platform data
    /// directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Whether to LZ4-compress record blocks (default: true)
    #[serde(default = "default_true")]
    pub compress: bool,
}

impl StorageConfig {
    /// Resolved storage directory.
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        data_dir()
            .map(|d| d.join("captures"))
            .unwrap_or_else(|| PathBuf::from("captures"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            compress: default_true(),
        }
    }
}

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interpolation window, in ticks, applied to pose records that arrive
    /// through the action queue (default: 3)
    #[serde(default = "default_pose_window")]
    pub pose_window: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            pose_window: default_pose_window(),
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

fn default_pose_window() -> u32 {
    3
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.mocap", "", "Mocap")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory for capture storage.
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.mocap", "", "Mocap")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> MocapConfig {
    config_dir()
        .and_then(|dir| std::fs::read_to_string(dir.join("config.toml")).ok())
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &MocapConfig) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join("config.toml"), content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MocapConfig::default();
        assert_eq!(config.capture.sample_interval_ms, 50);
        assert_eq!(config.capture.sample_interval(), Duration::from_millis(50));
        assert!(config.storage.compress);
        assert!(config.storage.dir.is_none());
        assert_eq!(config.playback.pose_window, 3);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = MocapConfig::default();
        config.capture.sample_interval_ms = 25;
        config.storage.dir = Some(PathBuf::from("/tmp/captures"));
        config.storage.compress = false;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: MocapConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: MocapConfig = toml::from_str("").unwrap();
        assert_eq!(config, MocapConfig::default());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: MocapConfig = toml::from_str("[storage]\ncompress = false\n").unwrap();
        assert!(!config.storage.compress);
        assert_eq!(config.capture.sample_interval_ms, 50);
    }

    #[test]
    fn test_explicit_storage_dir_wins() {
        let config: MocapConfig =
            toml::from_str("[storage]\ndir = \"/var/mocap\"\n").unwrap();
        assert_eq!(config.storage.resolved_dir(), PathBuf::from("/var/mocap"));
    }
}
