//! Fixture plugins and peer builders

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use peerplug::plugin::api::{
    CapabilityDeclaration, GrantedPermissions, Message, PeerContext, PeerDispatcher, Plugin,
    PluginDescriptor, PluginKey, PluginRegistry, PluginSettings, SharedPluginRegistry,
};

pub const BATTERY: &str = "kdeconnect.battery";
pub const BATTERY_REQUEST: &str = "kdeconnect.battery.request";

/// Mirrors the peer's charge level and answers requests for ours
pub struct BatteryPlugin {
    context: Arc<PeerContext>,
    charge: Arc<AtomicI64>,
}

impl BatteryPlugin {
    pub fn peer_charge(&self) -> i64 {
        self.charge.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Plugin for BatteryPlugin {
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
        if message.is_type(BATTERY) {
            match message.get_i64("currentCharge") {
                Some(charge) => {
                    self.charge.store(charge, Ordering::SeqCst);
                    true
                }
                None => false,
            }
        } else if message.is_type(BATTERY_REQUEST) {
            self.context.send(
                Message::new(BATTERY)
                    .with("currentCharge", 80)
                    .with("isCharging", false),
            )
        } else {
            false
        }
    }
}

impl PluginDescriptor for BatteryPlugin {
    const KEY: PluginKey = PluginKey::new("battery");

    fn declare() -> CapabilityDeclaration {
        CapabilityDeclaration::builder("Battery monitor")
            .description("Show the battery level of the other device")
            .incoming([BATTERY, BATTERY_REQUEST])
            .outgoing([BATTERY])
            .optional_permissions(["POST_NOTIFICATIONS"])
            .build()
    }

    fn create(context: Arc<PeerContext>) -> Self {
        Self {
            context,
            charge: Arc::new(AtomicI64::new(-1)),
        }
    }
}

/// Builtins plus the battery fixture
pub fn registry() -> SharedPluginRegistry {
    let mut registry = PluginRegistry::with_builtins().unwrap();
    registry.register_plugin::<BatteryPlugin>().unwrap();
    SharedPluginRegistry::new(registry)
}

pub struct Peer {
    pub gate: Arc<GrantedPermissions>,
    pub outbound: mpsc::UnboundedReceiver<Message>,
    pub dispatcher: PeerDispatcher,
}

/// Loaded dispatcher for a loopback peer
pub async fn peer(granted: &[&str], paired: bool, settings: PluginSettings) -> Peer {
    let gate: Arc<GrantedPermissions> = Arc::new(granted.iter().copied().collect());
    let (context, outbound) = PeerContext::loopback("fixture-peer", "Fixture Phone", gate.clone());
    let mut dispatcher = PeerDispatcher::new(
        Arc::new(context.with_paired(paired)),
        registry(),
        settings,
    );
    dispatcher.reload().await;
    Peer {
        gate,
        outbound,
        dispatcher,
    }
}
