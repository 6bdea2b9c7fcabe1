//! Error types for the HTTP layer.
//!
//! [`ApiError`] covers client mistakes only; nothing in the core can fail
//! a request. It converts into an Axum response via
//! [`IntoResponse`](axum::response::IntoResponse).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The submission body was not a valid `{ data: Event }`.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A query parameter could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidPayload(msg) | Self::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
