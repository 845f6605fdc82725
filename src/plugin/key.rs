//! Plugin identity keys
//!
//! Every plugin type declares its key as a constant. Keys are the registry key
//! and the key under which per-peer settings are stored, so they must never
//! change once a plugin ships.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::plugin::error::{PluginError, PluginResult};

/// Stable identifier of a plugin type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey(&'static str);

impl PluginKey {
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Keys are non-empty and limited to `[A-Za-z0-9_.-]`
    pub fn validate(&self) -> PluginResult<()> {
        if self.0.is_empty() {
            return Err(PluginError::InvalidKey {
                key: self.0.to_string(),
                reason: "key is empty".to_string(),
            });
        }
        if let Some(c) = self
            .0
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(PluginError::InvalidKey {
                key: self.0.to_string(),
                reason: format!("character '{}' is not allowed", c),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for PluginKey {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Serialize for PluginKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}
