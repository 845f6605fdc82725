//! Plugin Error Handling
//!
//! Error types for registration, lifecycle misuse, message routing and
//! settings persistence. Activation and message-handling failures are not
//! errors: they are reported as booleans by the plugin itself.

use crate::plugin::lifecycle::LifecycleState;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// No plugin registered under this key
    #[error("Plugin not found: {key}")]
    PluginNotFound { key: String },

    /// Two plugin types claimed the same key
    #[error("Plugin key '{key}' is already registered")]
    DuplicateKey { key: String },

    /// Key is empty or uses characters outside `[A-Za-z0-9_.-]`
    #[error("Invalid plugin key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Capability declaration violates an invariant
    #[error("Invalid capability declaration for '{key}': {cause}")]
    InvalidDeclaration { key: String, cause: String },

    /// Lifecycle call out of order
    #[error("Plugin '{key}' cannot {operation} while {state}")]
    InvalidTransition {
        key: String,
        state: LifecycleState,
        operation: String,
    },

    /// Message type not in the plugin's incoming set
    #[error("Plugin '{key}' does not accept messages of type '{packet_type}'")]
    UndeclaredMessageType { key: String, packet_type: String },

    /// Reading or writing per-peer settings failed
    #[error("Plugin settings error for {location}: {cause}")]
    Settings { location: String, cause: String },

    /// User-facing configuration problem
    #[error("{message}")]
    Configuration { message: String },
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PluginError::Configuration { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::Configuration { message } => Some(message),
            _ => None,
        }
    }
}
