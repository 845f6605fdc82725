//! API for builtin plugin registration
//!
//! Builtin plugins submit a registry entry factory with the `builtin!` macro;
//! [`PluginRegistry::with_builtins`](crate::plugin::registry::PluginRegistry::with_builtins)
//! collects them at startup.

use crate::plugin::registry::PluginEntry;

/// Entry for a builtin plugin in the key table
pub struct BuiltinPluginEntry {
    pub entry: fn() -> PluginEntry,
}

inventory::collect!(BuiltinPluginEntry);

/// Register a builtin plugin type
///
/// ```ignore
/// builtin!(PluginEntry::of::<PingPlugin>);
/// ```
#[macro_export]
macro_rules! builtin {
    ($entry_expr:expr) => {
        inventory::submit!($crate::plugin::builtin::api::BuiltinPluginEntry {
            entry: $entry_expr
        });
    };
}

/// Get all registered builtin plugins
pub fn get_all_builtin_plugins() -> Vec<PluginEntry> {
    inventory::iter::<BuiltinPluginEntry>()
        .map(|builtin| (builtin.entry)())
        .collect()
}
