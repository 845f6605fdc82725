//! Plugin Trait System
//!
//! The contract every feature module implements, split in two halves:
//!
//! - [`PluginDescriptor`] is the type-level half: the plugin's key, its
//!   capability declaration and its constructor. The registry uses it without
//!   creating an instance.
//! - [`Plugin`] is the instance half: lifecycle hooks, message handlers and
//!   permission checks. Everything except identity and context access has a
//!   default, so a plugin overrides only what it needs.
//!
//! A plugin is constructed with its [`PeerContext`] and keeps it for its whole
//! lifetime; there is no way to observe an instance without one.
//!
//! # Call order
//!
//! The dispatcher serializes calls on one instance:
//! construction, then [`Plugin::on_create`], then any number of
//! [`Plugin::on_packet_received`], then [`Plugin::on_destroy`]. Handlers must
//! return promptly; long work belongs on a spawned task that the plugin stops
//! in `on_destroy`.

use std::sync::Arc;

use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::context::PeerContext;
use crate::plugin::key::PluginKey;
use crate::plugin::message::Message;
use crate::plugin::permission::{
    PermissionPrompt, PromptKind, DEFAULT_OPTIONAL_PERMISSION_EXPLANATION,
    DEFAULT_PERMISSION_EXPLANATION,
};

/// Instance half of the plugin contract
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Registry and settings key of this plugin's type
    fn key(&self) -> PluginKey;

    /// Same value as the type's [`PluginDescriptor::declare`]
    fn capabilities(&self) -> CapabilityDeclaration;

    /// The peer this instance was created for
    fn context(&self) -> &PeerContext;

    /// Set up listeners and state. Returning false leaves the plugin inactive
    /// and the host shows [`Plugin::required_permission_prompt`] or
    /// [`Plugin::activation_failure_message`].
    async fn on_create(&mut self) -> bool {
        true
    }

    /// Release listeners, tasks and handles. Called at most once, possibly
    /// without a successful `on_create`. Must not fail.
    async fn on_destroy(&mut self) {}

    /// Handle a message whose type is in the incoming set. The return value
    /// says whether the plugin acted on it and is advisory only.
    async fn on_packet_received(&mut self, _message: &Message) -> bool {
        false
    }

    /// Handle a message from an unpaired peer. Only called when the
    /// declaration sets `accepts_unbound_peer_messages`.
    async fn on_unbound_peer_packet_received(&mut self, _message: &Message) -> bool {
        false
    }

    /// Run the plugin's main action, if it declares one
    async fn on_main_action(&mut self) -> bool {
        false
    }

    /// Reason shown when required permissions are missing
    fn permission_explanation(&self) -> String {
        DEFAULT_PERMISSION_EXPLANATION.to_string()
    }

    /// Reason shown when optional permissions are missing
    fn optional_permission_explanation(&self) -> String {
        DEFAULT_OPTIONAL_PERMISSION_EXPLANATION.to_string()
    }

    /// Shown when `on_create` failed although every required permission is granted
    fn activation_failure_message(&self) -> String {
        format!("{} could not be started", self.capabilities().display_name)
    }

    fn check_required_permissions(&self) -> bool {
        self.context()
            .permissions()
            .are_all_granted(&self.capabilities().required_permissions)
    }

    fn check_optional_permissions(&self) -> bool {
        self.context()
            .permissions()
            .are_all_granted(&self.capabilities().optional_permissions)
    }

    fn required_permission_prompt(&self, request_code: i32) -> PermissionPrompt {
        let capabilities = self.capabilities();
        PermissionPrompt::new(
            PromptKind::Required,
            capabilities.display_name,
            self.permission_explanation(),
            capabilities.required_permissions,
            request_code,
        )
    }

    fn optional_permission_prompt(&self, request_code: i32) -> PermissionPrompt {
        let capabilities = self.capabilities();
        PermissionPrompt::new(
            PromptKind::Optional,
            capabilities.display_name,
            self.optional_permission_explanation(),
            capabilities.optional_permissions,
            request_code,
        )
    }
}

/// Type-level half of the plugin contract
pub trait PluginDescriptor: Plugin + Sized + 'static {
    const KEY: PluginKey;

    /// Pure: returns the same declaration on every call
    fn declare() -> CapabilityDeclaration;

    /// Build an instance bound to `context`
    fn create(context: Arc<PeerContext>) -> Self;
}
