//! Background startup helper.
//!
//! [`spawn_server`] binds eagerly, so address errors surface to the caller,
//! then runs the server on a Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sketchsync_server::{AppState, ServerConfig, spawn_server};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::with_defaults());
//! let (addr, handle) = spawn_server(&ServerConfig::default(), state, shutdown).await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the sketchsync server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind `config` and serve on a background task until `shutdown`
/// completes.
///
/// Returns the bound address (useful with port 0) and the task handle.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound. Serve
/// errors after startup are logged from the task.
pub async fn spawn_server<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "sketchsync server exited with error");
        }
    });

    tracing::info!(%addr, "sketchsync server spawned on background task");

    Ok((addr, handle))
}
