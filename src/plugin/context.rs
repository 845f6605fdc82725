//! Peer context
//!
//! One remote device plus the local environment its plugins run in. The
//! dispatcher owns the context and hands every plugin instance it creates for
//! that peer a shared handle at construction time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::plugin::message::Message;
use crate::plugin::permission::PermissionGate;

pub struct PeerContext {
    peer_id: String,
    peer_name: String,
    paired: AtomicBool,
    platform_version: u32,
    permissions: Arc<dyn PermissionGate>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl PeerContext {
    /// Context for an untrusted peer on the host's compiled platform level
    pub fn new(
        peer_id: impl Into<String>,
        peer_name: impl Into<String>,
        permissions: Arc<dyn PermissionGate>,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            peer_name: peer_name.into(),
            paired: AtomicBool::new(false),
            platform_version: crate::core::version::platform_version(),
            permissions,
            outbound,
        }
    }

    /// Context whose outbound messages land in the returned receiver
    pub fn loopback(
        peer_id: impl Into<String>,
        peer_name: impl Into<String>,
        permissions: Arc<dyn PermissionGate>,
    ) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(peer_id, peer_name, permissions, tx), rx)
    }

    pub fn with_platform_version(mut self, platform_version: u32) -> Self {
        self.platform_version = platform_version;
        self
    }

    pub fn with_paired(self, paired: bool) -> Self {
        self.paired.store(paired, Ordering::SeqCst);
        self
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    pub fn platform_version(&self) -> u32 {
        self.platform_version
    }

    /// Whether identity/trust negotiation with the peer has completed
    pub fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    pub(crate) fn set_paired(&self, paired: bool) {
        self.paired.store(paired, Ordering::SeqCst);
    }

    pub fn permissions(&self) -> &dyn PermissionGate {
        self.permissions.as_ref()
    }

    /// Queue a message for the peer. Returns false once the transport has
    /// gone away.
    pub fn send(&self, message: Message) -> bool {
        let packet_type = message.packet_type.clone();
        match self.outbound.send(message) {
            Ok(()) => true,
            Err(_) => {
                log::warn!(
                    "Dropping '{}' for peer {}: transport closed",
                    packet_type,
                    self.peer_id
                );
                false
            }
        }
    }
}

impl fmt::Debug for PeerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerContext")
            .field("peer_id", &self.peer_id)
            .field("peer_name", &self.peer_name)
            .field("paired", &self.is_paired())
            .field("platform_version", &self.platform_version)
            .finish()
    }
}
