//! Plugin instance wrapper
//!
//! Pairs a plugin with its lifecycle state and refuses every call the state
//! machine does not allow, so a misbehaving dispatcher gets a defined error
//! instead of a plugin seeing calls out of order.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;

use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::key::PluginKey;
use crate::plugin::lifecycle::{LifecycleEvent, LifecycleState};
use crate::plugin::message::Message;
use crate::plugin::traits::Plugin;

pub struct PluginInstance {
    key: PluginKey,
    declaration: CapabilityDeclaration,
    state: LifecycleState,
    plugin: Box<dyn Plugin>,
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("key", &self.key)
            .field("state", &self.state)
            .finish()
    }
}

impl PluginInstance {
    /// Wrap a freshly constructed plugin; it starts out bound
    pub fn new(plugin: Box<dyn Plugin>) -> Self {
        Self {
            key: plugin.key(),
            declaration: plugin.capabilities(),
            state: LifecycleState::Bound,
            plugin,
        }
    }

    pub fn key(&self) -> PluginKey {
        self.key
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn declaration(&self) -> &CapabilityDeclaration {
        &self.declaration
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    /// Whether this instance may see messages from an unpaired peer right now
    pub fn accepts_unbound(&self) -> bool {
        self.state.can_receive_unbound_packets() && self.declaration.accepts_unbound_peer_messages
    }

    fn refuse(&self, operation: &str) -> PluginError {
        PluginError::InvalidTransition {
            key: self.key.to_string(),
            state: self.state,
            operation: operation.to_string(),
        }
    }

    /// Run the start hook. Only valid once, from `Bound`.
    pub async fn create(&mut self) -> PluginResult<bool> {
        if !self.state.can_create() {
            return Err(self.refuse("create"));
        }

        let success = match AssertUnwindSafe(self.plugin.on_create()).catch_unwind().await {
            Ok(success) => success,
            Err(_) => {
                log::error!("Plugin '{}' panicked while starting", self.key);
                false
            }
        };
        let event = LifecycleEvent::Create { success };
        self.state = self
            .state
            .transition(event)
            .ok_or_else(|| self.refuse("create"))?;

        if success {
            log::debug!("Plugin '{}' is active", self.key);
        } else {
            log::warn!("Plugin '{}' failed to start", self.key);
        }
        Ok(success)
    }

    /// Mark a bound plugin as failed without running its start hook. Used
    /// when the host already knows activation cannot succeed.
    pub fn fail(&mut self) -> PluginResult<()> {
        self.state = self
            .state
            .transition(LifecycleEvent::Create { success: false })
            .ok_or_else(|| self.refuse("fail"))?;
        log::warn!("Plugin '{}' was not started", self.key);
        Ok(())
    }

    /// Tear the plugin down. The first call runs `on_destroy`, later calls do
    /// nothing. Returns whether teardown ran.
    pub async fn destroy(&mut self) -> bool {
        let Some(next) = self.state.transition(LifecycleEvent::Destroy) else {
            log::debug!("Plugin '{}' already destroyed", self.key);
            return false;
        };

        let teardown = AssertUnwindSafe(self.plugin.on_destroy()).catch_unwind().await;
        if teardown.is_err() {
            log::error!("Plugin '{}' panicked during teardown", self.key);
        }
        self.state = next;
        log::debug!("Plugin '{}' destroyed", self.key);
        true
    }

    /// Deliver a trusted-peer message. Requires `Active` and a declared type.
    pub async fn deliver(&mut self, message: &Message) -> PluginResult<bool> {
        if !self.state.can_receive_packets() {
            return Err(self.refuse("receive packets"));
        }
        self.check_declared(message)?;

        let handled = AssertUnwindSafe(self.plugin.on_packet_received(message))
            .catch_unwind()
            .await;
        Ok(self.handled_or_log(handled, message))
    }

    /// Deliver a message from an unpaired peer to a plugin that opted in
    pub async fn deliver_unbound(&mut self, message: &Message) -> PluginResult<bool> {
        if !self.accepts_unbound() {
            return Err(self.refuse("receive unbound peer packets"));
        }
        self.check_declared(message)?;

        let handled = AssertUnwindSafe(self.plugin.on_unbound_peer_packet_received(message))
            .catch_unwind()
            .await;
        Ok(self.handled_or_log(handled, message))
    }

    /// Run the main action of an active plugin
    pub async fn main_action(&mut self) -> PluginResult<bool> {
        if !self.state.can_receive_packets() {
            return Err(self.refuse("run its main action"));
        }
        Ok(self.plugin.on_main_action().await)
    }

    fn check_declared(&self, message: &Message) -> PluginResult<()> {
        if self.declaration.accepts(&message.packet_type) {
            Ok(())
        } else {
            Err(PluginError::UndeclaredMessageType {
                key: self.key.to_string(),
                packet_type: message.packet_type.clone(),
            })
        }
    }

    fn handled_or_log(
        &self,
        outcome: Result<bool, Box<dyn std::any::Any + Send>>,
        message: &Message,
    ) -> bool {
        match outcome {
            Ok(handled) => handled,
            Err(_) => {
                log::error!(
                    "Plugin '{}' panicked handling '{}'",
                    self.key,
                    message.packet_type
                );
                false
            }
        }
    }
}
