//! Contacts Plugin
//!
//! Lets the peer synchronise the local address book. Needs `READ_CONTACTS`;
//! without it the plugin refuses to start and the host shows the required
//! permission prompt.
//!
//! The peer first asks for every contact uid with its last-modified
//! timestamp, then requests the vCards of the uids it is missing.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builtin;
use crate::plugin::capability::CapabilityDeclaration;
use crate::plugin::context::PeerContext;
use crate::plugin::key::PluginKey;
use crate::plugin::message::Message;
use crate::plugin::registry::PluginEntry;
use crate::plugin::traits::{Plugin, PluginDescriptor};

pub const PACKET_TYPE_REQUEST_ALL_UIDS_TIMESTAMPS: &str =
    "kdeconnect.contacts.request_all_uids_timestamps";
pub const PACKET_TYPE_REQUEST_VCARDS_BY_UIDS: &str = "kdeconnect.contacts.request_vcards_by_uid";
pub const PACKET_TYPE_RESPONSE_UIDS_TIMESTAMPS: &str = "kdeconnect.contacts.response_uids_timestamps";
pub const PACKET_TYPE_RESPONSE_VCARDS: &str = "kdeconnect.contacts.response_vcards";

pub const READ_CONTACTS: &str = "READ_CONTACTS";

builtin!(PluginEntry::of::<ContactsPlugin>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    /// Milliseconds since the epoch
    pub last_modified: i64,
    pub vcard: String,
}

#[derive(Debug)]
pub struct ContactsPlugin {
    context: Arc<PeerContext>,
    contacts: BTreeMap<String, ContactRecord>,
}

impl ContactsPlugin {
    pub fn insert_contact(&mut self, uid: impl Into<String>, record: ContactRecord) {
        self.contacts.insert(uid.into(), record);
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn send_uids_timestamps(&self) -> bool {
        let mut response = Message::new(PACKET_TYPE_RESPONSE_UIDS_TIMESTAMPS);
        for (uid, record) in &self.contacts {
            response.set(uid, record.last_modified);
        }
        response.set("uids", self.contacts.keys().cloned().collect::<Vec<_>>());
        self.context.send(response)
    }

    fn send_vcards(&self, request: &Message) -> bool {
        let Some(requested) = request.body.get("uids").and_then(Value::as_array) else {
            log::warn!("Contacts request from {} has no uid list", self.context.peer_id());
            return false;
        };

        let mut response = Message::new(PACKET_TYPE_RESPONSE_VCARDS);
        let mut found = Vec::new();
        for uid in requested.iter().filter_map(Value::as_str) {
            match self.contacts.get(uid) {
                Some(record) => {
                    response.set(uid, record.vcard.as_str());
                    found.push(uid.to_string());
                }
                None => log::debug!("Peer asked for unknown contact '{}'", uid),
            }
        }
        response.set("uids", found);
        self.context.send(response)
    }
}

#[async_trait::async_trait]
impl Plugin for ContactsPlugin {
    fn key(&self) -> PluginKey {
        Self::KEY
    }

    fn capabilities(&self) -> CapabilityDeclaration {
        Self::declare()
    }

    fn context(&self) -> &PeerContext {
        &self.context
    }

    async fn on_create(&mut self) -> bool {
        self.check_required_permissions()
    }

    async fn on_destroy(&mut self) {
        self.contacts.clear();
    }

    async fn on_packet_received(&mut self, message: &Message) -> bool {
        match message.packet_type.as_str() {
            PACKET_TYPE_REQUEST_ALL_UIDS_TIMESTAMPS => self.send_uids_timestamps(),
            PACKET_TYPE_REQUEST_VCARDS_BY_UIDS => self.send_vcards(message),
            other => {
                log::debug!("Contacts plugin ignoring '{}'", other);
                false
            }
        }
    }

    fn permission_explanation(&self) -> String {
        "You need to grant permission to access contacts".to_string()
    }
}

impl PluginDescriptor for ContactsPlugin {
    const KEY: PluginKey = PluginKey::new("contacts");

    fn declare() -> CapabilityDeclaration {
        CapabilityDeclaration::builder("Contacts")
            .description("Allow synchronizing the device's contacts book")
            .min_platform_version(18)
            .required_permissions([READ_CONTACTS])
            .incoming([
                PACKET_TYPE_REQUEST_ALL_UIDS_TIMESTAMPS,
                PACKET_TYPE_REQUEST_VCARDS_BY_UIDS,
            ])
            .outgoing([
                PACKET_TYPE_RESPONSE_UIDS_TIMESTAMPS,
                PACKET_TYPE_RESPONSE_VCARDS,
            ])
            .build()
    }

    fn create(context: Arc<PeerContext>) -> Self {
        Self {
            context,
            contacts: BTreeMap::new(),
        }
    }
}
