//! Generic error handling utilities
//!
//! Shared by the plugin and configuration layers so every domain error is
//! reported with the same shape: a single primary line for the user and the
//! full detail at debug level.

/// Errors that can tell a user-actionable problem apart from a system fault.
///
/// User-actionable errors (an unknown plugin key, a malformed config file) carry
/// a message that should be shown verbatim. System errors (I/O failures, a
/// plugin violating its lifecycle) are reported with the operation context and
/// their detail is only logged at debug level.
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True if this error carries a message meant for the user
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with a detail level that depends on who can act on it
///
/// # Examples
/// ```rust,no_run
/// # use peerplug::core::error_handling::log_error_with_context;
/// # use peerplug::plugin::api::PluginError;
/// let err = PluginError::Configuration { message: "Unknown plugin key 'battery'".to_string() };
/// log_error_with_context(&err, "Enabling plugin");
/// // Logs: "FATAL: Unknown plugin key 'battery'"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    if error.is_user_actionable() {
        if let Some(user_msg) = error.user_message() {
            log::error!("FATAL: {}", user_msg);
        } else {
            log::error!("FATAL: {}", operation_context);
        }
    } else {
        log::error!("FATAL: {}", operation_context);
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
