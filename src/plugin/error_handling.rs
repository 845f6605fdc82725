//! Plugin-specific error handling utilities
//!
//! Thin wrapper over the shared `core::error_handling` reporting so plugin
//! code and the dispatcher log failures with one call.

use crate::core::error_handling::log_error_with_context;
use crate::plugin::error::PluginError;

/// Log a plugin error with the operation that failed
pub fn log_plugin_error_with_context(error: &PluginError, operation_context: &str) {
    log_error_with_context(error, operation_context);
}
