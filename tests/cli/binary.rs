//! Runs the built binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn peerplug(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_peerplug"))
        .arg("--config-file")
        .arg(config)
        .arg("--no-color")
        .args(args)
        .output()
        .unwrap()
}

fn config(dir: &TempDir, granted: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("peerplug.toml");
    let granted: Vec<String> = granted.iter().map(|p| format!("\"{}\"", p)).collect();
    std::fs::write(
        &path,
        format!(
            "[logging]\nlevel = \"off\"\n\n[host]\nsettings_dir = \"{}\"\ngranted_permissions = [{}]\n",
            dir.path().join("peers").display(),
            granted.join(", ")
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_list() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(&config(&dir, &[]), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ping"));
    assert!(stdout.contains("contacts"));
}

#[test]
fn test_describe_json() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(&config(&dir, &[]), &["describe", "contacts", "--json"]);

    assert!(output.status.success());
    let declaration: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(declaration["display_name"], "Contacts");
    assert_eq!(declaration["required_permissions"][0], "READ_CONTACTS");
}

#[test]
fn test_describe_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(&config(&dir, &[]), &["describe", "telepathy"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("telepathy"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(&dir.path().join("absent.toml"), &["list"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.toml"));
}

#[test]
fn test_simulate_reports_failure_and_delivery() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(
        &config(&dir, &[]),
        &["simulate", "--paired", "--send", "kdeconnect.ping", "--send", "kdeconnect.mpris"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAILED"));
    assert!(stdout.contains("READ_CONTACTS"));
    assert!(stdout.contains("kdeconnect.ping -> ping"));
    assert!(stdout.contains("kdeconnect.mpris -> no plugin"));
}

#[test]
fn test_simulate_with_granted_permission() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(
        &config(&dir, &["READ_CONTACTS"]),
        &[
            "simulate",
            "--paired",
            "--send",
            "kdeconnect.contacts.request_all_uids_timestamps",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("FAILED"));
    assert!(stdout.contains("sent kdeconnect.contacts.response_uids_timestamps"));
}

#[test]
fn test_simulate_rejects_peer_id_outside_settings_dir() {
    let dir = TempDir::new().unwrap();
    let output = peerplug(
        &config(&dir, &[]),
        &["simulate", "--paired", "--peer", "../escape"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("../escape"));
    assert!(!dir.path().join("escape.toml").exists());
}
