//! Peer Dispatcher
//!
//! Owns the plugin instances of one peer and drives them through their
//! lifecycle:
//! - decides which registered plugins are loaded for the peer (platform level,
//!   per-peer settings, trust)
//! - binds, starts and tears down instances as that set changes
//! - routes incoming messages by type tag to the instances allowed to see them
//! - collects activation failures and the permission prompts that go with them
//!
//! Calls on one instance are serialized through its mutex. Deliveries to
//! different instances run concurrently.

use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::plugin::context::PeerContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::error_handling::log_plugin_error_with_context;
use crate::plugin::instance::PluginInstance;
use crate::plugin::key::PluginKey;
use crate::plugin::lifecycle::LifecycleState;
use crate::plugin::message::Message;
use crate::plugin::permission::PermissionPrompt;
use crate::plugin::registry::{PluginEntry, SharedPluginRegistry};
use crate::plugin::settings::PluginSettings;

type SharedInstance = Arc<Mutex<PluginInstance>>;

/// A plugin whose start hook reported failure on the last reload
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationFailure {
    pub key: PluginKey,
    /// Text for the user: the permission explanation when required
    /// permissions are missing, otherwise the generic failure message
    pub message: String,
    /// Set when required permissions are missing
    pub prompt: Option<PermissionPrompt>,
}

/// An active plugin running without some of its optional permissions
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalPermissionGap {
    pub key: PluginKey,
    pub prompt: PermissionPrompt,
}

/// Outcome of routing one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub packet_type: String,
    /// Plugins the message was handed to
    pub delivered: Vec<PluginKey>,
    /// Subset of `delivered` that reported acting on it
    pub handled: Vec<PluginKey>,
}

impl DispatchReport {
    pub fn is_unhandled(&self) -> bool {
        self.handled.is_empty()
    }
}

pub struct PeerDispatcher {
    context: Arc<PeerContext>,
    registry: SharedPluginRegistry,
    settings: PluginSettings,
    instances: BTreeMap<PluginKey, SharedInstance>,
    /// Incoming type tag to the loaded plugins declaring it
    routes: HashMap<String, Vec<PluginKey>>,
    failures: Vec<ActivationFailure>,
    optional_gaps: Vec<OptionalPermissionGap>,
    next_request_code: i32,
}

impl std::fmt::Debug for PeerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerDispatcher")
            .field("peer_id", &self.context.peer_id())
            .field("loaded", &self.instances.keys().collect::<Vec<_>>())
            .field("failures", &self.failures.len())
            .finish()
    }
}

impl PeerDispatcher {
    /// Dispatcher with no plugins loaded; call [`PeerDispatcher::reload`] to
    /// bind and start them
    pub fn new(
        context: Arc<PeerContext>,
        registry: SharedPluginRegistry,
        settings: PluginSettings,
    ) -> Self {
        Self {
            context,
            registry,
            settings,
            instances: BTreeMap::new(),
            routes: HashMap::new(),
            failures: Vec::new(),
            optional_gaps: Vec::new(),
            next_request_code: 1,
        }
    }

    pub fn context(&self) -> &Arc<PeerContext> {
        &self.context
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Bring the loaded set in line with the registry, settings and the
    /// peer's trust state.
    ///
    /// Instances that failed to start are discarded and retried. Active
    /// instances whose required permissions were revoked are torn down and
    /// rebound, so they report the missing permissions again. Failures and
    /// optional permission gaps describe the state after this call.
    pub async fn reload(&mut self) {
        let paired = self.context.is_paired();
        log::debug!(
            "Reloading plugins for {} (paired: {})",
            self.context.peer_id(),
            paired
        );

        self.failures.clear();
        self.optional_gaps.clear();
        self.discard_stale().await;

        let shared = self.registry.inner().clone();
        let registry = shared.read().await;
        let desired: BTreeMap<PluginKey, &PluginEntry> = registry
            .entries()
            .filter(|entry| self.is_wanted(entry, paired))
            .map(|entry| (entry.key(), entry))
            .collect();

        let unwanted: Vec<PluginKey> = self
            .instances
            .keys()
            .filter(|key| !desired.contains_key(*key))
            .copied()
            .collect();
        for key in unwanted {
            self.unload(key).await;
        }

        for (key, entry) in &desired {
            if self.instances.contains_key(key) {
                continue;
            }
            let plugin = entry.instantiate(self.context.clone());
            if plugin.capabilities() != *entry.declaration() {
                log::error!(
                    "Plugin '{}' declares different capabilities than it registered, not loading it",
                    key
                );
                continue;
            }
            log::debug!("Bound plugin '{}' to {}", key, self.context.peer_id());
            self.instances
                .insert(*key, Arc::new(Mutex::new(PluginInstance::new(plugin))));
        }
        drop(desired);
        drop(registry);

        if paired {
            self.start_bound().await;
        }
        self.rebuild_routes().await;

        log::info!(
            "{} plugins loaded for {}, {} failed",
            self.instances.len(),
            self.context.peer_id(),
            self.failures.len()
        );
    }

    fn is_wanted(&self, entry: &PluginEntry, paired: bool) -> bool {
        let declaration = entry.declaration();
        if !declaration.is_supported_on(self.context.platform_version()) {
            log::debug!(
                "Plugin '{}' needs platform {}, host has {}",
                entry.key(),
                declaration.min_platform_version,
                self.context.platform_version()
            );
            return false;
        }
        if !self
            .settings
            .is_enabled(entry.key(), declaration.enabled_by_default)
        {
            return false;
        }
        paired || declaration.accepts_unbound_peer_messages
    }

    /// Unload failed instances and active ones that lost a required permission
    async fn discard_stale(&mut self) {
        let mut stale = Vec::new();
        for (key, instance) in &self.instances {
            let instance = instance.lock().await;
            match instance.state() {
                LifecycleState::Failed => stale.push(*key),
                LifecycleState::Active if !instance.plugin().check_required_permissions() => {
                    log::info!("Plugin '{}' lost a required permission", key);
                    stale.push(*key);
                }
                _ => {}
            }
        }
        for key in stale {
            self.unload(key).await;
        }
    }

    async fn unload(&mut self, key: PluginKey) {
        if let Some(instance) = self.instances.remove(&key) {
            instance.lock().await.destroy().await;
        }
    }

    /// Start bound instances and collect optional permission gaps of every
    /// active one
    async fn start_bound(&mut self) {
        let handles: Vec<(PluginKey, SharedInstance)> = self
            .instances
            .iter()
            .map(|(key, instance)| (*key, instance.clone()))
            .collect();

        for (key, handle) in handles {
            let mut instance = handle.lock().await;
            match instance.state() {
                LifecycleState::Bound => {
                    if !self.activate(key, &mut instance).await {
                        continue;
                    }
                }
                LifecycleState::Active => {}
                _ => continue,
            }

            if !instance.plugin().check_optional_permissions() {
                let code = self.take_request_code();
                self.optional_gaps.push(OptionalPermissionGap {
                    key,
                    prompt: instance.plugin().optional_permission_prompt(code),
                });
            }
        }
    }

    /// Required permissions gate activation before the start hook runs
    async fn activate(&mut self, key: PluginKey, instance: &mut PluginInstance) -> bool {
        if !instance.plugin().check_required_permissions() {
            if let Err(e) = instance.fail() {
                log_plugin_error_with_context(&e, "Plugin activation");
                return false;
            }
            let code = self.take_request_code();
            let plugin = instance.plugin();
            self.failures.push(ActivationFailure {
                key,
                message: plugin.permission_explanation(),
                prompt: Some(plugin.required_permission_prompt(code)),
            });
            return false;
        }

        match instance.create().await {
            Ok(true) => true,
            Ok(false) => {
                self.failures.push(ActivationFailure {
                    key,
                    message: instance.plugin().activation_failure_message(),
                    prompt: None,
                });
                false
            }
            Err(e) => {
                log_plugin_error_with_context(&e, "Plugin activation");
                false
            }
        }
    }

    fn take_request_code(&mut self) -> i32 {
        let code = self.next_request_code;
        self.next_request_code += 1;
        code
    }

    async fn rebuild_routes(&mut self) {
        let mut routes: HashMap<String, Vec<PluginKey>> = HashMap::new();
        for (key, instance) in &self.instances {
            let instance = instance.lock().await;
            for packet_type in &instance.declaration().incoming_types {
                routes.entry(packet_type.clone()).or_default().push(*key);
            }
        }
        self.routes = routes;
    }

    /// Route one message from the peer.
    ///
    /// A trusted peer's message goes to every active plugin declaring its
    /// type. An untrusted peer's message only goes to plugins that opted in
    /// to unbound messages.
    pub async fn dispatch(&self, message: &Message) -> DispatchReport {
        let mut report = DispatchReport {
            packet_type: message.packet_type.clone(),
            ..Default::default()
        };

        let Some(keys) = self.routes.get(&message.packet_type) else {
            log::debug!(
                "No plugin handles '{}' from {}",
                message.packet_type,
                self.context.peer_id()
            );
            return report;
        };

        let paired = self.context.is_paired();
        let deliveries = keys
            .iter()
            .filter_map(|key| self.instances.get(key).map(|i| (*key, i.clone())))
            .map(|(key, handle)| async move {
                let mut instance = handle.lock().await;
                let outcome = if paired {
                    if instance.state() != LifecycleState::Active {
                        return None;
                    }
                    instance.deliver(message).await
                } else {
                    if !instance.accepts_unbound() {
                        return None;
                    }
                    instance.deliver_unbound(message).await
                };

                match outcome {
                    Ok(handled) => Some((key, handled)),
                    Err(e) => {
                        log_plugin_error_with_context(&e, "Message delivery");
                        None
                    }
                }
            });

        for (key, handled) in join_all(deliveries).await.into_iter().flatten() {
            report.delivered.push(key);
            if handled {
                report.handled.push(key);
            }
        }

        if report.delivered.is_empty() {
            log::debug!(
                "'{}' from {} reached no plugin",
                message.packet_type,
                self.context.peer_id()
            );
        }
        report
    }

    /// Record a trust change and reload
    pub async fn set_paired(&mut self, paired: bool) {
        if self.context.is_paired() != paired {
            log::info!(
                "Peer {} is now {}",
                self.context.peer_id(),
                if paired { "paired" } else { "unpaired" }
            );
        }
        self.context.set_paired(paired);
        self.reload().await;
    }

    /// Persist the user's enabled choice for `key` and reload
    pub async fn set_plugin_enabled(&mut self, key: &str, enabled: bool) -> PluginResult<()> {
        let key = self
            .registry
            .inner()
            .read()
            .await
            .get(key)
            .map(PluginEntry::key)
            .ok_or_else(|| PluginError::PluginNotFound {
                key: key.to_string(),
            })?;

        self.settings.set_enabled(key, enabled);
        self.settings.save().await?;
        self.reload().await;
        Ok(())
    }

    /// Run the main action of a loaded plugin
    pub async fn main_action(&self, key: &str) -> PluginResult<bool> {
        let handle = self.find(key)?;
        let mut instance = handle.lock().await;
        instance.main_action().await
    }

    fn find(&self, key: &str) -> PluginResult<&SharedInstance> {
        self.instances
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, instance)| instance)
            .ok_or_else(|| PluginError::PluginNotFound {
                key: key.to_string(),
            })
    }

    /// Tear down every instance
    pub async fn shutdown(&mut self) {
        let keys: Vec<PluginKey> = self.instances.keys().copied().collect();
        for key in keys {
            self.unload(key).await;
        }
        self.routes.clear();
        log::debug!("Dispatcher for {} shut down", self.context.peer_id());
    }

    pub async fn plugin_state(&self, key: &str) -> Option<LifecycleState> {
        match self.find(key) {
            Ok(instance) => Some(instance.lock().await.state()),
            Err(_) => None,
        }
    }

    /// State of every loaded instance, ordered by key
    pub async fn states(&self) -> Vec<(PluginKey, LifecycleState)> {
        let mut states = Vec::with_capacity(self.instances.len());
        for (key, instance) in &self.instances {
            states.push((*key, instance.lock().await.state()));
        }
        states
    }

    pub async fn active_plugins(&self) -> Vec<PluginKey> {
        self.states()
            .await
            .into_iter()
            .filter(|(_, state)| *state == LifecycleState::Active)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn loaded_plugins(&self) -> Vec<PluginKey> {
        self.instances.keys().copied().collect()
    }

    pub fn failures(&self) -> &[ActivationFailure] {
        &self.failures
    }

    pub fn optional_permission_gaps(&self) -> &[OptionalPermissionGap] {
        &self.optional_gaps
    }
}
