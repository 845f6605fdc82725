//! Typed messages exchanged with a peer
//!
//! A message is a type tag plus an untyped JSON object body. Encoding on the
//! wire belongs to the transport; this crate only routes by type tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of data exchanged with a remote peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier assigned at creation (milliseconds since the epoch)
    pub id: i64,
    /// Type tag used for routing, e.g. `kdeconnect.ping`
    #[serde(rename = "type")]
    pub packet_type: String,
    #[serde(default)]
    pub body: Map<String, Value>,
}

impl Message {
    pub fn new(packet_type: impl Into<String>) -> Self {
        Self {
            id: chrono::Utc::now().timestamp_millis(),
            packet_type: packet_type.into(),
            body: Map::new(),
        }
    }

    /// Builder-style body field
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.body.insert(key.to_string(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.body.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.body.get(key).and_then(Value::as_i64)
    }

    pub fn is_type(&self, packet_type: &str) -> bool {
        self.packet_type == packet_type
    }
}
