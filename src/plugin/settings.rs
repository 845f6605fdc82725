//! Per-peer plugin settings
//!
//! Which plugins are enabled for a peer, plus free-form string values a plugin
//! keeps for itself. Stored as one TOML file per peer:
//!
//! ```toml
//! [plugins.ping]
//! enabled = false
//!
//! [plugins.contacts.values]
//! last_sync = "1700000000000"
//! ```
//!
//! A plugin without an explicit flag falls back to its declaration's
//! `enabled_by_default`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::key::PluginKey;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PluginSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    plugins: BTreeMap<String, PluginSection>,
}

/// Settings for the plugins of one peer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSettings {
    path: Option<PathBuf>,
    file: SettingsFile,
}

impl PluginSettings {
    /// Settings that are never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Settings file of `peer_id` inside `dir`. Peer ids come from the remote
    /// device and are limited to `[A-Za-z0-9_.-]` without a leading dot, so
    /// the file always lands directly inside `dir`.
    pub fn path_for_peer(dir: &Path, peer_id: &str) -> PluginResult<PathBuf> {
        let file_name = format!("{}.toml", peer_id);
        let refuse = |reason: &str| PluginError::Settings {
            location: dir.join(&file_name).display().to_string(),
            cause: format!("peer id '{}' {}", peer_id, reason),
        };

        if peer_id.is_empty() {
            return Err(refuse("is empty"));
        }
        if peer_id.starts_with('.') {
            return Err(refuse("starts with a dot"));
        }
        if peer_id
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(refuse("contains characters not allowed in a file name"));
        }
        Ok(dir.join(file_name))
    }

    /// Load settings from `path`. A missing file yields empty settings that
    /// will be written there on the next save.
    pub async fn load(path: impl Into<PathBuf>) -> PluginResult<Self> {
        let path = path.into();
        let file = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => toml::from_str(&contents).map_err(|e| settings_error(&path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No plugin settings at {}, using defaults", path.display());
                SettingsFile::default()
            }
            Err(e) => return Err(settings_error(&path, e)),
        };

        Ok(Self {
            path: Some(path),
            file,
        })
    }

    /// Write settings back to their file; in-memory settings are left alone
    pub async fn save(&self) -> PluginResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| settings_error(parent, e))?;
        }
        let contents = toml::to_string(&self.file).map_err(|e| settings_error(path, e))?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| settings_error(path, e))?;

        log::debug!("Saved plugin settings to {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Explicit flag for `key`, or `default` when none was stored
    pub fn is_enabled(&self, key: PluginKey, default: bool) -> bool {
        self.file
            .plugins
            .get(key.as_str())
            .and_then(|section| section.enabled)
            .unwrap_or(default)
    }

    pub fn set_enabled(&mut self, key: PluginKey, enabled: bool) {
        self.section_mut(key).enabled = Some(enabled);
    }

    pub fn value(&self, key: PluginKey, name: &str) -> Option<&str> {
        self.file
            .plugins
            .get(key.as_str())
            .and_then(|section| section.values.get(name))
            .map(String::as_str)
    }

    pub fn set_value(&mut self, key: PluginKey, name: &str, value: impl Into<String>) {
        self.section_mut(key)
            .values
            .insert(name.to_string(), value.into());
    }

    /// Forget everything stored for `key`
    pub fn reset(&mut self, key: PluginKey) {
        self.file.plugins.remove(key.as_str());
    }

    fn section_mut(&mut self, key: PluginKey) -> &mut PluginSection {
        self.file.plugins.entry(key.to_string()).or_default()
    }
}

fn settings_error(path: &Path, cause: impl std::fmt::Display) -> PluginError {
    PluginError::Settings {
        location: path.display().to_string(),
        cause: cause.to_string(),
    }
}
