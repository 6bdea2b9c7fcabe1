//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin drawing clients.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` and `GET /ws` -- `WebSocket` push channel
/// - `GET /long-poll` -- long-poll pull
/// - `GET /adaptive-poll` -- adaptive-poll pull
/// - `POST /draw` -- event submission
/// - `GET /api/status` -- hub counters
///
/// CORS allows any origin, as the drawing client is served separately.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Push
        .route("/", get(ws::ws_draw))
        .route("/ws", get(ws::ws_draw))
        // Pull
        .route("/long-poll", get(handlers::long_poll))
        .route("/adaptive-poll", get(handlers::adaptive_poll))
        // Produce
        .route("/draw", post(handlers::draw))
        // Monitoring
        .route("/api/status", get(handlers::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
