//! Ping Plugin
//!
//! Sends and receives `kdeconnect.ping`. An incoming ping may carry an
//! optional `message` field, which is logged alongside the running count.

use std::sync::Arc;

use crate::builtin;
use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::context::PeerContext;
use crate::plugin::key::PluginKey;
use crate::plugin::message::Message;
use crate::plugin::registry::PluginEntry;
use crate::plugin::traits::{Plugin, PluginDescriptor};

pub const PACKET_TYPE_PING: &str = "kdeconnect.ping";

builtin!(PluginEntry::of::<PingPlugin>);

#[derive(Debug)]
pub struct PingPlugin {
    context: Arc<PeerContext>,
    received: u64,
}

impl PingPlugin {
    /// Pings received since creation
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Send a ping, with an optional text shown by the peer
    pub fn send_ping(&self, text: Option<&str>) -> bool {
        let mut ping = Message::new(PACKET_TYPE_PING);
        if let Some(text) = text {
            ping.set("message", text);
        }
        self.context.send(ping)
    }
}

#[async_trait::async_trait]
impl Plugin for PingPlugin {
    fn key(&self) -> PluginKey {
        Self::KEY
    }

    fn capabilities(&self) -> CapabilityDeclaration {
        Self::declare()
    }

    fn context(&self) -> &PeerContext {
        &self.context
    }

    async fn on_packet_received(&mut self, message: &Message) -> bool {
        if !message.is_type(PACKET_TYPE_PING) {
            return false;
        }

        self.received += 1;
        match message.get_str("message") {
            Some(text) => log::info!(
                "Ping from {}: {} ({} received)",
                self.context.peer_name(),
                text,
                self.received
            ),
            None => log::info!(
                "Ping from {} ({} received)",
                self.context.peer_name(),
                self.received
            ),
        }
        true
    }

    async fn on_main_action(&mut self) -> bool {
        self.send_ping(None)
    }
}

impl PluginDescriptor for PingPlugin {
    const KEY: PluginKey = PluginKey::new("ping");

    fn declare() -> CapabilityDeclaration {
        CapabilityDeclaration::builder("Ping")
            .description("Send and receive pings")
            .action_name("Send ping")
            .icon("ic_action_ping")
            .incoming([PACKET_TYPE_PING])
            .outgoing([PACKET_TYPE_PING])
            .has_main_action(true)
            .display_in_context_menu(true)
            .build()
    }

    fn create(context: Arc<PeerContext>) -> Self {
        Self {
            context,
            received: 0,
        }
    }
}
