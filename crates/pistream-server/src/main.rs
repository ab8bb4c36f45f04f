//! pistream server binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `pistream-config.yaml` (defaults if absent)
//! 3. Build shared state and bind the listening address
//! 4. Serve until Ctrl-C, then cancel every open session and exit

use std::sync::Arc;

use pistream_core::StreamConfig;
use pistream_core::config::ConfigError;
use pistream_server::server::{ServerConfig, ServerError, start_server};
use pistream_server::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("pistream-server starting");

    // 2. Load configuration.
    let config = StreamConfig::load_default()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        initial_precision = config.series.initial_precision,
        precision_increment = config.series.precision_increment,
        growth_interval = config.series.growth_interval,
        max_precision = ?config.series.max_precision,
        "Configuration loaded"
    );

    // 3. Shared state.
    let state = Arc::new(AppState::new(&config));
    let server_config = ServerConfig::from(&config.server);

    // 4. Stop on Ctrl-C.
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C, serving until killed");
            return;
        }
        info!("Shutdown signal received");
        shutdown.cancel();
    });

    start_server(&server_config, state).await?;

    info!("pistream-server shutdown complete");
    Ok(())
}
