//! CLI argument parsing tests

use clap::Parser;
use peerplug::app::cli::args::*;
use std::path::PathBuf;

#[test]
fn test_global_flags_before_subcommand() {
    let args = Args::try_parse_from([
        "peerplug",
        "--config-file",
        "/tmp/peerplug.toml",
        "--log-level",
        "debug",
        "--log-file",
        "/tmp/peerplug.log",
        "list",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/tmp/peerplug.toml")));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/peerplug.log")));
    assert_eq!(args.command, Command::List);
}

#[test]
fn test_color_flags_conflict() {
    assert!(Args::try_parse_from(["peerplug", "--color", "--no-color", "list"]).is_err());

    let args = Args::try_parse_from(["peerplug", "--color", "list"]).unwrap();
    assert_eq!(args.color_choice(), Some(true));
}

#[test]
fn test_verbosity_counts() {
    let args = Args::try_parse_from(["peerplug", "-qqq", "list"]).unwrap();
    assert_eq!(args.verbosity(), -3);
}

#[test]
fn test_simulate_defaults() {
    let args = Args::try_parse_from(["peerplug", "simulate"]).unwrap();
    assert_eq!(
        args.command,
        Command::Simulate(SimulateArgs {
            peer: "simulated".to_string(),
            ..Default::default()
        })
    );
}

#[test]
fn test_simulate_actions() {
    let args = Args::try_parse_from([
        "peerplug", "simulate", "--paired", "--action", "ping", "--peer", "phone",
    ])
    .unwrap();
    let Command::Simulate(simulate) = args.command else {
        panic!("expected simulate");
    };
    assert_eq!(simulate.action, vec!["ping"]);
    assert_eq!(simulate.peer, "phone");
}

#[test]
fn test_describe_requires_key() {
    assert!(Args::try_parse_from(["peerplug", "describe"]).is_err());
}
