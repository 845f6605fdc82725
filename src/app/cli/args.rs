//! Command-line arguments
//!
//! Global flags configure logging and color; subcommands inspect the plugin
//! registry or simulate a peer session against it.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "peerplug")]
#[command(about = "Inspect and exercise device plugins")]
#[command(version)]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(
        short = 'o',
        long = "log-format",
        value_name = "FORMAT",
        global = true,
        value_parser = ["text", "ext", "json"]
    )]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// More log output*
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output*
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List every registered plugin
    List,

    /// Show the capability declaration of one plugin
    Describe {
        /// Plugin key
        #[arg(value_name = "KEY")]
        key: String,

        /// Print the declaration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load plugins for a loopback peer and deliver messages to them
    Simulate(SimulateArgs),
}

#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct SimulateArgs {
    /// Treat the peer as paired
    #[arg(long)]
    pub paired: bool,

    /// Grant a permission*
    #[arg(long = "grant", value_name = "PERMISSION", action = ArgAction::Append)]
    pub grant: Vec<String>,

    /// Deliver a message of this type*
    #[arg(long = "send", value_name = "TYPE", action = ArgAction::Append)]
    pub send: Vec<String>,

    /// Peer identifier, also names the peer's settings file
    #[arg(long = "peer", value_name = "ID", default_value = "simulated")]
    pub peer: String,

    /// Run the main action of a plugin after loading
    #[arg(long = "action", value_name = "KEY", action = ArgAction::Append)]
    pub action: Vec<String>,
}

impl Args {
    /// `-v` count minus `-q` count
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(i8::MAX as u8) as i8) - (self.quiet.min(i8::MAX as u8) as i8)
    }

    /// `Some(true)` for `--color`, `Some(false)` for `--no-color`, `None` to
    /// follow the terminal
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
