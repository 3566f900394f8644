//! Configuration file handling for camframe.
//!
//! Loads configuration from `<config dir>/camframe/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::buffer::LengthPolicy;
use crate::characteristics::{FrameRate, VideoCharacteristics};
use crate::error::FrameError;
use crate::format;
use crate::session::SessionSettings;

/// Configuration file structure for camframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Worker threads per conversion; 0 uses every CPU, larger values are capped at it.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub length_policy: LengthPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for snapshots written without an explicit path.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_format() -> String {
    "YUY2".to_string()
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_fps() -> u32 {
    30
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// With `None`, reads the default location and falls back to defaults
    /// if it doesn't exist. An explicit path must exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound(path));
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            length_policy: self.conversion.length_policy,
            workers: self.conversion.workers,
        }
    }
}

impl StreamConfig {
    /// Capture mode described by this section.
    pub fn characteristics(&self) -> Result<VideoCharacteristics, FrameError> {
        let format = format::resolve(&self.format)?;
        VideoCharacteristics::new(
            self.width,
            self.height,
            FrameRate::from_fps(self.fps),
            format,
        )
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Config file '{}' not found", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to access config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(source) => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound(_) => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("camframe").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/camframe/config.toml")
        })
}
