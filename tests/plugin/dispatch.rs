//! Routing tests through the public API

use crate::common::fixtures::{peer, BatteryPlugin, BATTERY, BATTERY_REQUEST};
use peerplug::plugin::api::{Message, PingPlugin, PluginDescriptor, PluginSettings};

#[tokio::test]
async fn test_battery_update_reaches_only_battery() {
    let peer = peer(&["READ_CONTACTS"], true, PluginSettings::in_memory()).await;

    let report = peer
        .dispatcher
        .dispatch(&Message::new(BATTERY).with("currentCharge", 42))
        .await;
    assert_eq!(report.delivered, vec![BatteryPlugin::KEY]);
    assert_eq!(report.handled, vec![BatteryPlugin::KEY]);
}

#[tokio::test]
async fn test_advisory_result_does_not_block_delivery() {
    let peer = peer(&[], true, PluginSettings::in_memory()).await;

    let report = peer.dispatcher.dispatch(&Message::new(BATTERY)).await;
    assert_eq!(report.delivered, vec![BatteryPlugin::KEY]);
    assert!(report.is_unhandled());
}

#[tokio::test]
async fn test_request_produces_outbound_message() {
    let mut peer = peer(&[], true, PluginSettings::in_memory()).await;

    peer.dispatcher.dispatch(&Message::new(BATTERY_REQUEST)).await;
    let sent = peer.outbound.recv().await.unwrap();
    assert!(sent.is_type(BATTERY));
    assert_eq!(sent.get_i64("currentCharge"), Some(80));
    assert_eq!(sent.get_bool("isCharging"), Some(false));
}

#[tokio::test]
async fn test_unknown_type_is_dropped() {
    let peer = peer(&[], true, PluginSettings::in_memory()).await;

    let report = peer.dispatcher.dispatch(&Message::new("kdeconnect.mpris")).await;
    assert_eq!(report.packet_type, "kdeconnect.mpris");
    assert!(report.delivered.is_empty());
}

#[tokio::test]
async fn test_untrusted_peer_messages_are_dropped() {
    let peer = peer(&[], false, PluginSettings::in_memory()).await;

    let report = peer.dispatcher.dispatch(&Message::new("kdeconnect.ping")).await;
    assert!(report.delivered.is_empty());
}

#[tokio::test]
async fn test_ping_main_action() {
    let mut peer = peer(&[], true, PluginSettings::in_memory()).await;

    assert!(peer.dispatcher.main_action(PingPlugin::KEY.as_str()).await.unwrap());
    assert!(peer.outbound.recv().await.unwrap().is_type("kdeconnect.ping"));
}
