//! Per-peer settings tests through the public API

use crate::common::fixtures::peer;
use peerplug::plugin::api::{PluginError, PluginKey, PluginSettings};
use tempfile::TempDir;

#[tokio::test]
async fn test_disabled_plugin_is_not_loaded() {
    let mut settings = PluginSettings::in_memory();
    settings.set_enabled(PluginKey::new("battery"), false);

    let peer = peer(&[], true, settings).await;
    assert!(!peer.dispatcher.loaded_plugins().contains(&PluginKey::new("battery")));
    assert!(peer.dispatcher.loaded_plugins().contains(&PluginKey::new("ping")));
}

#[tokio::test]
async fn test_toggle_persists_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = PluginSettings::path_for_peer(dir.path(), "fixture-peer").unwrap();

    let settings = PluginSettings::load(&path).await.unwrap();
    let mut peer = peer(&[], true, settings).await;
    peer.dispatcher.set_plugin_enabled("ping", false).await.unwrap();
    assert!(path.exists());

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[plugins.ping]"));
    assert!(contents.contains("enabled = false"));

    let reloaded = PluginSettings::load(&path).await.unwrap();
    assert!(!reloaded.is_enabled(PluginKey::new("ping"), true));
}

#[tokio::test]
async fn test_toggle_unknown_plugin() {
    let mut peer = peer(&[], true, PluginSettings::in_memory()).await;
    let err = peer
        .dispatcher
        .set_plugin_enabled("telepathy", true)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PluginError::PluginNotFound {
            key: "telepathy".to_string()
        }
    );
}
