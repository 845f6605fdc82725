//! Application startup
//!
//! Parses arguments, loads the host configuration, starts logging and runs
//! the selected subcommand on a tokio runtime.

use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::cli::args::{Args, Command, SimulateArgs};
use crate::app::cli::display;
use crate::core::config::HostConfig;
use crate::core::logging::{init_logging, level_for_verbosity, LogFormat};
use crate::core::styles::clap_styles;
use crate::core::version::{build_time, git_hash, platform_version};
use crate::plugin::api::{
    log_plugin_error_with_context, GrantedPermissions, Message, PeerContext, PeerDispatcher,
    PluginError, PluginRegistry, PluginResult, PluginSettings, SharedPluginRegistry,
};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initialize application startup
pub fn startup() {
    let matches = Args::command()
        .styles(clap_styles(std::io::stderr().is_terminal()))
        .get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(run(args));
    std::process::exit(code);
}

async fn run(args: Args) -> i32 {
    let config = match HostConfig::load(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    let use_color = args
        .color_choice()
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    if let Err(e) = start_logging(&args, &config, use_color) {
        eprintln!("Failed to initialise logging: {}", e);
        return 1;
    }
    log::debug!(
        "peerplug {} (platform {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        platform_version(),
        build_time(),
        git_hash()
    );

    let registry = match PluginRegistry::with_builtins() {
        Ok(registry) => registry,
        Err(e) => {
            log_plugin_error_with_context(&e, "Plugin registration");
            return 1;
        }
    };

    let result = match args.command {
        Command::List => list(&registry, use_color),
        Command::Describe { key, json } => describe(&registry, &key, json, use_color),
        Command::Simulate(simulate_args) => {
            simulate(registry, &config, simulate_args, use_color).await
        }
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            log_plugin_error_with_context(&e, "Command failed");
            match &e {
                PluginError::Configuration { message } => eprintln!("{}", message),
                PluginError::Settings { .. } => eprintln!("{}", e),
                _ => {}
            }
            1
        }
    }
}

fn start_logging(
    args: &Args,
    config: &HostConfig,
    use_color: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = args
        .log_level
        .as_deref()
        .or(config.logging.level.as_deref())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let level = level_for_verbosity(base, args.verbosity());

    let format = match args
        .log_format
        .as_deref()
        .or(config.logging.format.as_deref())
    {
        Some(name) => name.parse::<LogFormat>()?,
        None => LogFormat::default(),
    };
    let log_file: Option<PathBuf> = args
        .log_file
        .clone()
        .or_else(|| config.logging.file.clone());

    init_logging(level, format, log_file.as_deref(), use_color)
}

fn print_table(table: &prettytable::Table, use_color: bool) {
    if let Err(e) = table.print_tty(use_color) {
        log::warn!("Could not write table: {}", e);
    }
}

fn list(registry: &PluginRegistry, use_color: bool) -> PluginResult<()> {
    if registry.plugin_count() == 0 {
        println!("No plugins registered.");
        return Ok(());
    }
    print_table(&display::plugin_table(registry.entries()), use_color);
    Ok(())
}

fn describe(registry: &PluginRegistry, key: &str, json: bool, use_color: bool) -> PluginResult<()> {
    let entry = registry
        .get(key)
        .ok_or_else(|| PluginError::Configuration {
            message: format!("Unknown plugin key '{}'", key),
        })?;

    if json {
        let rendered = serde_json::to_string_pretty(entry.declaration()).map_err(|e| {
            PluginError::Configuration {
                message: format!("Could not render declaration of '{}': {}", key, e),
            }
        })?;
        println!("{}", rendered);
    } else {
        println!(
            "{}",
            display::describe_text(entry.key(), entry.declaration(), use_color)
        );
    }
    Ok(())
}

async fn simulate(
    registry: PluginRegistry,
    config: &HostConfig,
    args: SimulateArgs,
    use_color: bool,
) -> PluginResult<()> {
    let gate: GrantedPermissions = config
        .host
        .granted_permissions
        .iter()
        .chain(args.grant.iter())
        .cloned()
        .collect();
    let (context, mut outbound) = PeerContext::loopback(&args.peer, "Simulated peer", Arc::new(gate));
    let context = context
        .with_platform_version(config.host.platform_version.unwrap_or_else(platform_version))
        .with_paired(args.paired);

    let settings = match config.settings_dir() {
        Some(dir) => PluginSettings::load(PluginSettings::path_for_peer(&dir, &args.peer)?).await?,
        None => PluginSettings::in_memory(),
    };

    let mut dispatcher = PeerDispatcher::new(
        Arc::new(context),
        SharedPluginRegistry::new(registry),
        settings,
    );
    dispatcher.reload().await;

    let states = dispatcher.states().await;
    if states.is_empty() {
        println!("No plugins loaded.");
    } else {
        print_table(&display::state_table(&states), use_color);
    }
    for line in display::activation_report(
        dispatcher.failures(),
        dispatcher.optional_permission_gaps(),
        use_color,
    ) {
        println!("{}", line);
    }

    for key in &args.action {
        match dispatcher.main_action(key).await {
            Ok(ran) => println!("{}: main action {}", key, if ran { "ran" } else { "did nothing" }),
            Err(e) => log_plugin_error_with_context(&e, "Main action"),
        }
    }

    for packet_type in &args.send {
        let report = dispatcher.dispatch(&Message::new(packet_type.as_str())).await;
        println!("{}", display::dispatch_line(&report, use_color));
    }

    dispatcher.shutdown().await;

    while let Ok(message) = outbound.try_recv() {
        let body = serde_json::Value::Object(message.body.clone());
        println!("sent {} {}", message.packet_type, body);
    }
    Ok(())
}
