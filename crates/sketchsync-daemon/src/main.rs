//! sketchsync server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sketchsync.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the event hub and wire the poll responders
//! 4. Bind and serve until `Ctrl-C`

mod error;

use std::path::Path;
use std::sync::Arc;

use sketchsync_core::config::SyncConfig;
use sketchsync_core::{SyncHub, SystemClock};
use sketchsync_server::{AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::DaemonError;

/// Config file looked up relative to the working directory.
const CONFIG_PATH: &str = "sketchsync.yaml";

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // 1. Load configuration. Logging is not up yet, so report the source
    //    once the subscriber exists.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        from_file,
        port = config.server.port,
        long_poll_timeout_ms = config.long_poll.timeout_ms,
        adaptive_active_ms = config.adaptive_poll.active_delay_ms,
        adaptive_idle_ms = config.adaptive_poll.idle_delay_ms,
        "sketchsync starting"
    );

    // 3. Create the hub and application state.
    let hub = Arc::new(SyncHub::new());
    let state = Arc::new(AppState::new(hub, Arc::new(SystemClock), &config));

    // 4. Serve until interrupted.
    let server_config = ServerConfig::from(&config.server);
    let listener = sketchsync_server::bind(&server_config).await?;
    sketchsync_server::serve(listener, Arc::clone(&state), shutdown_signal()).await?;

    info!(events = state.hub.len(), "sketchsync shutdown complete");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults plus
/// environment overrides when the file is missing.
fn load_config() -> Result<(SyncConfig, bool), DaemonError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok((SyncConfig::from_file(path)?, true))
    } else {
        Ok((SyncConfig::from_env()?, false))
    }
}

/// Resolve on `Ctrl-C`. If the handler cannot be installed the server
/// runs until the process is killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
