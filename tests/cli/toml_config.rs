//! Host configuration file tests

use peerplug::core::config::{ConfigError, HostConfig};
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("peerplug.toml");
    std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

    let config = HostConfig::load(Some(&path)).await.unwrap();
    assert_eq!(config.logging.level.as_deref(), Some("info"));
    assert_eq!(config.host.platform_version, None);
    assert!(config.host.granted_permissions.is_empty());
}

#[tokio::test]
async fn test_settings_dir_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("peerplug.toml");
    std::fs::write(&path, "[host]\nsettings_dir = \"/srv/peers\"\n").unwrap();

    let config = HostConfig::load(Some(&path)).await.unwrap();
    assert_eq!(config.settings_dir(), Some(PathBuf::from("/srv/peers")));
}

#[tokio::test]
async fn test_wrong_value_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("peerplug.toml");
    std::fs::write(&path, "[host]\nplatform_version = \"new\"\n").unwrap();

    let err = HostConfig::load(Some(&path)).await.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
