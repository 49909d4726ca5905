//! chatrelay - Real-time presence-and-chat relay server
//!
//! Serves a WebSocket endpoint for presence and chat fan-out, an avatar
//! upload endpoint, and the static client assets.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatrelay::{config::ConfigManager, AppServer, AppState, ShutdownCoordinator};

/// CLI arguments for chatrelay
#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(about = "chatrelay - Real-time presence-and-chat relay server")]
#[command(version)]
#[command(long_about = "
chatrelay - Real-time presence-and-chat relay server

Clients connect over a WebSocket, identify themselves with a display name
and avatar, and exchange broadcast chat messages. The active-user list is
pushed to every client on each membership change.

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  CHATRELAY_BIND_ADDR        - Bind address (e.g., 0.0.0.0:3000)
  CHATRELAY_SHUTDOWN_TIMEOUT - Graceful shutdown timeout (e.g., 30s)
  CHATRELAY_STATIC_DIR       - Directory of bundled client assets
  CHATRELAY_UPLOADS_DIR      - Directory for uploaded avatars
  CHATRELAY_MAX_UPLOAD_BYTES - Upload size limit in bytes
  CHATRELAY_LOG_LEVEL        - Log level (trace, debug, info, warn, error)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Bind address (overrides config file)
    #[arg(short, long, help = "Bind address (e.g., 0.0.0.0:3000)")]
    pub bind: Option<String>,

    /// Port to bind to (overrides config file)
    #[arg(short, long, help = "Port to bind to")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help = "Log level")]
    pub log_level: String,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Directory of bundled client assets
    #[arg(long, help = "Directory of bundled client assets")]
    pub static_dir: Option<String>,

    /// Directory for uploaded avatars
    #[arg(long, help = "Directory for uploaded avatars")]
    pub uploads_dir: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing
    init_tracing(&args)?;

    info!(
        "Starting chatrelay v{} - Real-time presence-and-chat relay",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        info!("Config file not found, checking environment variables");
        ConfigManager::load_from_env()?
    };

    // Apply CLI argument overrides (highest priority)
    config.merge_with_cli_args(
        args.bind.as_deref(),
        args.port,
        args.static_dir.as_deref(),
        args.uploads_dir.as_deref(),
    );

    // Final validation after all overrides
    config
        .validate()
        .context("Final configuration validation failed")?;

    // If validate-config flag is set, just validate and exit
    if args.validate_config {
        info!("Configuration is valid");
        info!("Configuration summary:");
        info!("  Bind address: {}", config.server.bind_addr);
        info!("  Shutdown timeout: {:?}", config.server.shutdown_timeout);
        info!("  Static dir: {}", config.http.static_dir.display());
        info!("  Uploads dir: {}", config.http.uploads_dir.display());
        info!("  Max upload: {} bytes", config.http.max_upload_bytes);
        return Ok(());
    }

    info!("Configuration loaded successfully");
    info!("Bind address: {}", config.server.bind_addr);
    info!("Uploads dir: {}", config.http.uploads_dir.display());

    // Make sure the uploads directory exists before the first upload
    std::fs::create_dir_all(&config.http.uploads_dir).with_context(|| {
        format!(
            "Failed to create uploads directory: {}",
            config.http.uploads_dir.display()
        )
    })?;

    // Create shutdown coordinator
    let shutdown_timeout = config.server.shutdown_timeout;
    let shutdown_coordinator = ShutdownCoordinator::new(shutdown_timeout);

    // Build shared state and the server
    let bind_addr = config.server.bind_addr;
    let state = AppState::new(Arc::new(config));
    let hub = Arc::clone(&state.hub);
    let server = AppServer::new(bind_addr, state);

    // Start the server in a separate task
    let server_shutdown_rx = shutdown_coordinator.subscribe();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.start(server_shutdown_rx).await {
            error!("Server error: {}", e);
        }
    });

    info!("chatrelay started successfully");
    info!("Press Ctrl+C or send SIGTERM/SIGINT to shutdown gracefully");

    // Start listening for shutdown signals
    let signal_result = shutdown_coordinator.listen_for_signals().await;
    if let Err(e) = signal_result {
        error!("Error setting up signal handlers: {}", e);
    }

    // Initiate graceful shutdown
    info!("Initiating graceful shutdown...");

    // Wait for open connections to drain, then for the server task
    if let Err(e) = shutdown_coordinator.drain_connections(&hub).await {
        warn!("Error while draining connections: {}", e);
    }

    if let Err(e) = server_handle.await {
        if !e.is_cancelled() {
            error!("Server task failed: {}", e);
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}
