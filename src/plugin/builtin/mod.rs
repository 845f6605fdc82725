//! Built-in Plugin Implementations
//!
//! Plugins that ship with the host. Each one registers itself with the
//! `builtin!` macro and is picked up by `PluginRegistry::with_builtins`.

pub mod api;
pub mod contacts;
pub mod ping;
