//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/long-poll` | Held until new events or the ceiling timeout |
//! | `GET` | `/adaptive-poll` | Fixed delay chosen from activity at arrival |
//! | `POST` | `/draw` | Append one event |
//! | `GET` | `/api/status` | Log length, subscribers, suspended polls |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use sketchsync_core::HubStats;
use sketchsync_types::{DrawRequest, DrawResponse, PollQuery, PollResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the client offset. Empty and out-of-range values are clamped
/// later; only a non-integer is rejected.
fn offset_from(query: Result<Query<PollQuery>, QueryRejection>) -> Result<i64, ApiError> {
    let Query(query) = query?;
    query.raw_offset().ok_or_else(|| {
        ApiError::InvalidQuery("lastUpdate must be an integer".to_owned())
    })
}

// ---------------------------------------------------------------------------
// GET /long-poll
// ---------------------------------------------------------------------------

/// Reply at once if the client is behind, otherwise hold until an append
/// or the ceiling timeout.
///
/// # Query Parameters
///
/// - `lastUpdate`: offset already consumed (missing or empty means 0,
///   clamped to the log)
pub async fn long_poll(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<PollResponse>, ApiError> {
    let raw_offset = offset_from(query)?;
    let batch = state.long_poll.respond(raw_offset).await;
    Ok(Json(batch.into()))
}

// ---------------------------------------------------------------------------
// GET /adaptive-poll
// ---------------------------------------------------------------------------

/// Reply after the active delay if the client is behind at arrival, or
/// after the idle delay otherwise.
pub async fn adaptive_poll(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<PollResponse>, ApiError> {
    let raw_offset = offset_from(query)?;
    let batch = state.adaptive_poll.respond(raw_offset).await;
    Ok(Json(batch.into()))
}

// ---------------------------------------------------------------------------
// POST /draw
// ---------------------------------------------------------------------------

/// Append one event and report how long it took to reach the server.
///
/// A malformed body is rejected with 400 and the log is left untouched.
pub async fn draw(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DrawRequest>, JsonRejection>,
) -> Result<Json<DrawResponse>, ApiError> {
    let Json(request) = body?;
    let receipt = state.hub.submit(request.data, state.clock.now_millis());
    Ok(Json(DrawResponse::success(receipt.response_time_ms)))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Current hub counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<HubStats> {
    Json(state.hub.stats())
}
