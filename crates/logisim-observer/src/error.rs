//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logisim_core::{CommandError, TickError};

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A UUID could not be parsed from the request.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A player command was rejected.
    #[error("command rejected: {0}")]
    Command(#[from] CommandError),

    /// The day-advance aborted and was rolled back.
    #[error("{0}")]
    Tick(#[from] TickError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::InvalidQuery(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Command(e) => (command_status(e), e.to_string()),
            Self::Tick(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

const fn command_status(error: &CommandError) -> StatusCode {
    match error {
        CommandError::UnknownLocation(_)
        | CommandError::UnknownProduct(_)
        | CommandError::UnknownOrder(_)
        | CommandError::UnknownSpike(_) => StatusCode::NOT_FOUND,
        e if e.is_recoverable() => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
