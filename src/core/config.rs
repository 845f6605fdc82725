//! Host configuration file loading
//!
//! The host configuration is a TOML file, looked up at
//! `<config_dir>/peerplug/peerplug.toml` unless a path is given explicitly.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "ext"
//! file = "/tmp/peerplug.log"
//!
//! [host]
//! platform_version = 30
//! settings_dir = "/var/lib/peerplug/peers"
//! granted_permissions = ["READ_CONTACTS"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {cause}", .path.display())]
    Read { path: PathBuf, cause: String },

    #[error("Error parsing configuration file {}: {cause}", .path.display())]
    Parse { path: PathBuf, cause: String },
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

/// `[host]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSection {
    /// Overrides the platform level compiled into the binary
    pub platform_version: Option<u32>,
    /// Directory holding one settings file per peer
    pub settings_dir: Option<PathBuf>,
    /// Permissions the simulated permission authority reports as granted
    pub granted_permissions: Vec<String>,
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub logging: LoggingConfig,
    pub host: HostSection,
}

impl HostConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("peerplug").join("peerplug.toml"))
    }

    /// Default directory for per-peer plugin settings
    pub fn default_settings_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("peerplug").join("peers"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one the default path is used when
    /// present, otherwise the built-in defaults apply.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::Read {
                path: path.clone(),
                cause: e.to_string(),
            })?;
        let config = Self::parse(&path, &contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }

    /// Settings directory from the file, falling back to the platform default
    pub fn settings_dir(&self) -> Option<PathBuf> {
        self.host
            .settings_dir
            .clone()
            .or_else(Self::default_settings_dir)
    }
}
