//! Zonewatch - industrial zone encroachment analysis client
//!
//! Starts analysis runs on the remote backend, keeps the latest result in
//! a local store and shows the dashboard views derived from it. Every view
//! follows the shared result through the broadcaster, so a fresh run
//! updates all of them at once.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, storage, invalid arguments)
//!   2 - The analysis run failed

mod broadcast;
mod cli;
mod config;
mod console;
mod models;
mod report;
mod store;
mod trigger;
mod views;

use anyhow::{Context, Result};
use broadcast::Broadcaster;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use console::ConsoleHooks;
use models::Zone;
use std::sync::Arc;
use store::{FileStorage, MemoryStorage, ResultStore, Storage};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use trigger::{AnalysisTrigger, HttpBackend};
use views::{Dashboard, DashboardSnapshot};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle commands that need neither logging nor the backend
    if args.init_config {
        return handle_init_config();
    }
    if args.list_zones {
        handle_list_zones();
        return Ok(());
    }

    // Load configuration; CLI values take precedence over the file
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(&args, &config);

    info!("Zonewatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Effective configuration: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Zonewatch failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .zonewatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the backend URL, timeout and storage path.");
    Ok(())
}

/// Handle --list-zones.
fn handle_list_zones() {
    println!("Available zones:");
    for (index, zone) in Zone::ALL.iter().enumerate() {
        let marker = if *zone == Zone::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:>2}. {}{}", index + 1, zone, marker);
    }
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the selected command. Returns the exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let backend = HttpBackend::new(&config.backend.base_url, config.backend.timeout_seconds)?;

    if args.health {
        return handle_health(&backend).await;
    }

    // Shared result distribution: one store, one broadcaster, all views
    // attached before anything runs.
    let storage: Arc<dyn Storage> = if args.no_store {
        info!("Keeping the result in memory only");
        Arc::new(MemoryStorage::new())
    } else {
        let file = FileStorage::new(config.store.path.clone());
        info!("Result store at {}", file.path().display());
        Arc::new(file)
    };
    let store = Arc::new(ResultStore::new(storage));
    let broadcaster = Broadcaster::new();
    let dashboard = Dashboard::mount(&store, &broadcaster, backend.base_url());

    if args.show {
        let snapshot = dashboard.snapshot(store.last_updated());
        dashboard.unmount();
        emit(&snapshot, config.general.format, &args)?;
        return Ok(0);
    }

    let zone = args.selected_zone();
    // Keep stdout clean when it carries JSON
    let json_to_stdout = config.general.format == OutputFormat::Json && args.output.is_none();
    let hooks = Arc::new(ConsoleHooks::new(!args.quiet && !json_to_stdout));
    let trigger = AnalysisTrigger::new(Arc::new(backend), Arc::clone(&store), broadcaster)
        .with_hooks(hooks);

    let exit_code = match trigger.run(zone).await {
        Ok(outcome) => {
            if !outcome.is_published() {
                warn!("A newer result is already stored; showing that one");
            }
            let snapshot = dashboard.snapshot(store.last_updated());
            emit(&snapshot, config.general.format, &args)?;
            0
        }
        Err(e) => {
            eprintln!("❌ Analysis Failed: {}", e);
            2
        }
    };

    dashboard.unmount();
    Ok(exit_code)
}

/// Handle --health: report whether the backend answers.
async fn handle_health(backend: &HttpBackend) -> Result<i32> {
    println!("🔎 Checking analysis backend at {}", backend.base_url());

    match backend.health().await {
        Ok(health) if health.is_healthy() => {
            println!("✅ Backend is healthy");
            if let Some(ref timestamp) = health.timestamp {
                println!("   Server time: {}", timestamp);
            }
            Ok(0)
        }
        Ok(health) => {
            eprintln!("⚠️  Backend reported status: {}", health.status);
            Ok(2)
        }
        Err(e) => {
            eprintln!("❌ Backend unavailable: {}", e);
            Ok(2)
        }
    }
}

/// Render the snapshot and write it to --output or stdout.
fn emit(snapshot: &DashboardSnapshot, format: OutputFormat, args: &Args) -> Result<()> {
    let output = match format {
        OutputFormat::Json => report::render_json(snapshot)?,
        OutputFormat::Text => report::render_text(snapshot),
    };

    match args.output {
        Some(ref path) => {
            report::write_output(&output, path)?;
            if !args.quiet {
                println!("📝 Views saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
