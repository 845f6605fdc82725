//! Permission gate
//!
//! A query surface over the host's permission authority. Nothing here grants
//! or requests a permission: checks are read-only, and prompts are plain
//! descriptions that a presentation layer renders and acts upon.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::RwLock;

/// Default reason shown when required permissions are missing
pub const DEFAULT_PERMISSION_EXPLANATION: &str = "This plugin needs permissions to work";

/// Default reason shown when optional permissions are missing
pub const DEFAULT_OPTIONAL_PERMISSION_EXPLANATION: &str =
    "You need to grant extra permissions to enable all functions";

/// Read-only view of granted permissions
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self, permission: &str) -> bool;

    /// First permission in `permissions` that is not granted, in order
    fn first_denied<'a>(&self, permissions: &'a [String]) -> Option<&'a str> {
        permissions
            .iter()
            .map(String::as_str)
            .find(|p| !self.is_granted(p))
    }

    /// Stops at the first denied permission
    fn are_all_granted(&self, permissions: &[String]) -> bool {
        self.first_denied(permissions).is_none()
    }
}

/// In-process permission table, used by hosts that mirror grants from the OS
/// and by the CLI simulation
#[derive(Debug, Default)]
pub struct GrantedPermissions {
    granted: RwLock<HashSet<String>>,
}

impl GrantedPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, permission: impl Into<String>) {
        if let Ok(mut granted) = self.granted.write() {
            granted.insert(permission.into());
        }
    }

    pub fn revoke(&self, permission: &str) {
        if let Ok(mut granted) = self.granted.write() {
            granted.remove(permission);
        }
    }

    pub fn granted(&self) -> Vec<String> {
        let mut list: Vec<String> = self
            .granted
            .read()
            .map(|g| g.iter().cloned().collect())
            .unwrap_or_default();
        list.sort();
        list
    }
}

impl<S: Into<String>> FromIterator<S> for GrantedPermissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            granted: RwLock::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

impl PermissionGate for GrantedPermissions {
    fn is_granted(&self, permission: &str) -> bool {
        self.granted
            .read()
            .map(|g| g.contains(permission))
            .unwrap_or(false)
    }
}

/// Which permission set a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptKind {
    Required,
    Optional,
}

/// Description of a permission request for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionPrompt {
    pub kind: PromptKind,
    /// Plugin display name
    pub title: String,
    /// Reason shown to the user
    pub message: String,
    /// Exact set to request, in declaration order
    pub permissions: Vec<String>,
    /// Correlates the OS answer with this prompt
    pub request_code: i32,
    pub positive_label: String,
    pub negative_label: String,
}

impl PermissionPrompt {
    pub fn new(
        kind: PromptKind,
        title: impl Into<String>,
        message: impl Into<String>,
        permissions: Vec<String>,
        request_code: i32,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            permissions,
            request_code,
            positive_label: "OK".to_string(),
            negative_label: "Cancel".to_string(),
        }
    }
}
