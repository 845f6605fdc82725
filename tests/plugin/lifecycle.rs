//! Lifecycle tests through the public API

use crate::common::fixtures::{peer, BatteryPlugin};
use peerplug::plugin::api::{
    LifecycleState, PluginDescriptor, PluginSettings, PromptKind, DEFAULT_OPTIONAL_PERMISSION_EXPLANATION,
};

#[tokio::test]
async fn test_trusted_peer_lifecycle() {
    let mut peer = peer(&["READ_CONTACTS", "POST_NOTIFICATIONS"], true, PluginSettings::in_memory()).await;

    let states = peer.dispatcher.states().await;
    assert!(states.iter().all(|(_, state)| *state == LifecycleState::Active));
    assert_eq!(states.len(), 3);
    assert!(peer.dispatcher.failures().is_empty());
    assert!(peer.dispatcher.optional_permission_gaps().is_empty());

    peer.dispatcher.shutdown().await;
    assert!(peer.dispatcher.states().await.is_empty());
}

#[tokio::test]
async fn test_contacts_fails_without_permission() {
    let peer = peer(&["POST_NOTIFICATIONS"], true, PluginSettings::in_memory()).await;

    assert_eq!(
        peer.dispatcher.plugin_state("contacts").await,
        Some(LifecycleState::Failed)
    );
    assert_eq!(
        peer.dispatcher.plugin_state("ping").await,
        Some(LifecycleState::Active)
    );

    let failures = peer.dispatcher.failures();
    assert_eq!(failures.len(), 1);
    let prompt = failures[0].prompt.as_ref().unwrap();
    assert_eq!(prompt.kind, PromptKind::Required);
    assert_eq!(prompt.title, "Contacts");
    assert_eq!(prompt.permissions, vec!["READ_CONTACTS"]);
    assert_eq!(prompt.positive_label, "OK");
    assert_eq!(prompt.negative_label, "Cancel");
}

#[tokio::test]
async fn test_granting_permission_then_reloading() {
    let mut peer = peer(&[], true, PluginSettings::in_memory()).await;
    assert_eq!(
        peer.dispatcher.plugin_state("contacts").await,
        Some(LifecycleState::Failed)
    );

    peer.gate.grant("READ_CONTACTS");
    peer.dispatcher.reload().await;
    assert_eq!(
        peer.dispatcher.plugin_state("contacts").await,
        Some(LifecycleState::Active)
    );
}

#[tokio::test]
async fn test_optional_gap_reported_for_battery() {
    let peer = peer(&["READ_CONTACTS"], true, PluginSettings::in_memory()).await;

    let gaps = peer.dispatcher.optional_permission_gaps();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].key, BatteryPlugin::KEY);
    assert_eq!(gaps[0].prompt.kind, PromptKind::Optional);
    assert_eq!(gaps[0].prompt.message, DEFAULT_OPTIONAL_PERMISSION_EXPLANATION);
    assert_eq!(
        peer.dispatcher.plugin_state("battery").await,
        Some(LifecycleState::Active)
    );
}

#[tokio::test]
async fn test_untrusted_peer_loads_nothing_by_default() {
    let peer = peer(&["READ_CONTACTS"], false, PluginSettings::in_memory()).await;
    assert!(peer.dispatcher.loaded_plugins().is_empty());
}

#[tokio::test]
async fn test_revoking_permission_then_reloading() {
    let mut peer = peer(&["READ_CONTACTS"], true, PluginSettings::in_memory()).await;
    assert_eq!(
        peer.dispatcher.plugin_state("contacts").await,
        Some(LifecycleState::Active)
    );

    peer.gate.revoke("READ_CONTACTS");
    peer.dispatcher.reload().await;
    assert_eq!(
        peer.dispatcher.plugin_state("contacts").await,
        Some(LifecycleState::Failed)
    );
    assert_eq!(peer.dispatcher.failures().len(), 1);
}

#[tokio::test]
async fn test_optional_gap_survives_settings_change() {
    let mut peer = peer(&["READ_CONTACTS"], true, PluginSettings::in_memory()).await;
    assert_eq!(peer.dispatcher.optional_permission_gaps().len(), 1);

    peer.dispatcher.set_plugin_enabled("ping", false).await.unwrap();
    let gaps = peer.dispatcher.optional_permission_gaps();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].key, BatteryPlugin::KEY);
}
