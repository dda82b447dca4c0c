//! Configuration management (~/.config/Rigkit/config.toml)
//!
//! Settings are stored in TOML in the platform-specific config directory.
//! Every field has a default, so a missing file or section behaves like an
//! empty one.

use std::path::{Path, PathBuf};

use rig_formats::DecodeLimits;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the config file inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Structural limits applied while decoding
    #[serde(default)]
    pub decode: DecodeLimits,
    /// Playback clock settings
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Rate used when a clip stores no usable rate (default: 30.0)
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f32,
    /// Blend between keyframes; when false the pose snaps to the current frame (default: true)
    #[serde(default = "default_true")]
    pub interpolate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is not set (default: "info")
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_fallback_fps() -> f32 {
    30.0
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "info".to_string()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fallback_fps: default_fallback_fps(),
            interpolate: default_true(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Rigkit\config`
/// On macOS: `~/Library/Application Support/io.rigkit.Rigkit`
/// On Linux: `~/.config/Rigkit`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.rigkit", "", "Rigkit")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .and_then(|dir| load_from(&dir.join(CONFIG_FILE)).ok())
        .unwrap_or_default()
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
