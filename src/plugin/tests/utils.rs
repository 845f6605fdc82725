//! Plugin Test Utilities
//!
//! Configurable mock plugin plus helpers for building peer contexts and
//! registry entries, shared by the plugin test modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::context::PeerContext;
use crate::plugin::key::PluginKey;
use crate::plugin::message::Message;
use crate::plugin::permission::GrantedPermissions;
use crate::plugin::registry::PluginEntry;
use crate::plugin::traits::Plugin;

/// Counts every call a mock plugin receives
#[derive(Debug, Default)]
pub struct CallLog {
    creates: AtomicUsize,
    destroys: AtomicUsize,
    packets: AtomicUsize,
    unbound_packets: AtomicUsize,
    received: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn packets(&self) -> usize {
        self.packets.load(Ordering::SeqCst)
    }

    pub fn unbound_packets(&self) -> usize {
        self.unbound_packets.load(Ordering::SeqCst)
    }

    /// Message types seen by either handler, in arrival order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    fn record(&self, message: &Message) {
        self.received
            .lock()
            .unwrap()
            .push(message.packet_type.clone());
    }
}

/// Mock plugin whose declaration and failure modes are set per test
pub struct MockPlugin {
    key: PluginKey,
    declaration: CapabilityDeclaration,
    context: Arc<PeerContext>,
    calls: Arc<CallLog>,
    fail_create: bool,
    panic_on_destroy: bool,
}

impl MockPlugin {
    pub fn new(key: &'static str, context: Arc<PeerContext>) -> Self {
        Self {
            key: PluginKey::new(key),
            declaration: CapabilityDeclaration::builder(key).build(),
            context,
            calls: Arc::new(CallLog::default()),
            fail_create: false,
            panic_on_destroy: false,
        }
    }

    pub fn incoming<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declaration
            .incoming_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_declaration(mut self, declaration: CapabilityDeclaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_calls(mut self, calls: Arc<CallLog>) -> Self {
        self.calls = calls;
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn panic_on_destroy(mut self) -> Self {
        self.panic_on_destroy = true;
        self
    }

    pub fn calls(&self) -> Arc<CallLog> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl Plugin for MockPlugin {
    fn key(&self) -> PluginKey {
        self.key
    }

    fn capabilities(&self) -> CapabilityDeclaration {
        self.declaration.clone()
    }

    fn context(&self) -> &PeerContext {
        &self.context
    }

    async fn on_create(&mut self) -> bool {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        !self.fail_create
    }

    async fn on_destroy(&mut self) {
        self.calls.destroys.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_destroy {
            panic!("mock teardown failure");
        }
    }

    async fn on_packet_received(&mut self, message: &Message) -> bool {
        self.calls.packets.fetch_add(1, Ordering::SeqCst);
        self.calls.record(message);
        true
    }

    async fn on_unbound_peer_packet_received(&mut self, message: &Message) -> bool {
        self.calls.unbound_packets.fetch_add(1, Ordering::SeqCst);
        self.calls.record(message);
        true
    }
}

/// Loopback peer context with the given grants
pub fn mock_context(
    granted: &[&str],
    paired: bool,
) -> (Arc<PeerContext>, mpsc::UnboundedReceiver<Message>) {
    let gate: GrantedPermissions = granted.iter().copied().collect();
    let (context, rx) = PeerContext::loopback("mock-peer", "Mock Phone", Arc::new(gate));
    (Arc::new(context.with_paired(paired)), rx)
}

/// Registry entry that builds mock plugins sharing one call log
pub fn mock_entry(
    key: &'static str,
    declaration: CapabilityDeclaration,
    calls: Arc<CallLog>,
) -> PluginEntry {
    mock_entry_with(key, declaration, calls, false)
}

/// Like [`mock_entry`], with every instance failing its start hook
pub fn failing_entry(
    key: &'static str,
    declaration: CapabilityDeclaration,
    calls: Arc<CallLog>,
) -> PluginEntry {
    mock_entry_with(key, declaration, calls, true)
}

fn mock_entry_with(
    key: &'static str,
    declaration: CapabilityDeclaration,
    calls: Arc<CallLog>,
    fail_create: bool,
) -> PluginEntry {
    let factory_declaration = declaration.clone();
    PluginEntry::new(
        PluginKey::new(key),
        declaration,
        Arc::new(move |context: Arc<PeerContext>| -> Box<dyn Plugin> {
            let mut plugin = MockPlugin::new(key, context)
                .with_declaration(factory_declaration.clone())
                .with_calls(calls.clone());
            if fail_create {
                plugin = plugin.fail_create();
            }
            Box::new(plugin)
        }),
    )
}
