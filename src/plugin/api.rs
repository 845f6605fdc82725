//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Plugin contract
pub use crate::plugin::key::PluginKey;
pub use crate::plugin::traits::{Plugin, PluginDescriptor};

// Capabilities and messages
pub use crate::plugin::capability::{
    CapabilityBuilder, CapabilityDeclaration, BASE_PLATFORM_VERSION,
};
pub use crate::plugin::message::Message;

// Permissions
pub use crate::plugin::permission::{
    GrantedPermissions, PermissionGate, PermissionPrompt, PromptKind,
    DEFAULT_OPTIONAL_PERMISSION_EXPLANATION, DEFAULT_PERMISSION_EXPLANATION,
};

// Lifecycle
pub use crate::plugin::instance::PluginInstance;
pub use crate::plugin::lifecycle::{LifecycleEvent, LifecycleState};

// Peer context and dispatch
pub use crate::plugin::context::PeerContext;
pub use crate::plugin::dispatcher::{
    ActivationFailure, DispatchReport, OptionalPermissionGap, PeerDispatcher,
};

// Plugin registry for management
pub use crate::plugin::registry::{
    PluginEntry, PluginFactory, PluginRegistry, SharedPluginRegistry,
};

// Per-peer settings
pub use crate::plugin::settings::PluginSettings;

// Error handling
pub use crate::plugin::error::{PluginError, PluginResult};
pub use crate::plugin::error_handling::log_plugin_error_with_context;

// Builtin plugins
pub use crate::plugin::builtin::contacts::ContactsPlugin;
pub use crate::plugin::builtin::ping::PingPlugin;
