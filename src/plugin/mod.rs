//! Plugin System Module
//!
//! The contract between the host and its feature plugins: capability
//! declarations, the lifecycle state machine, permission gating and
//! per-peer message dispatch.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod capability;
pub(crate) mod context;
pub(crate) mod dispatcher;
pub(crate) mod error;
pub(crate) mod error_handling;
pub(crate) mod instance;
pub(crate) mod key;
pub(crate) mod lifecycle;
pub(crate) mod message;
pub(crate) mod permission;
pub(crate) mod registry;
pub(crate) mod settings;
pub(crate) mod traits;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
