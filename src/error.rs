// Caller-facing error taxonomy. Handlers return `ApiError` and the
// `IntoResponse` impl maps each kind to its status code and JSON message.
// Internal causes are logged, never sent to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing required fields/identifiers → 400.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// Login rejection. Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed, expired, or wrongly-signed bearer credential.
    /// All verification failure modes collapse here.
    #[error("Unauthorized: Invalid or missing token")]
    Unauthenticated,

    /// Record absent OR owned by another user — deliberately one outcome,
    /// so non-owners cannot probe for task existence.
    #[error("Task not found or unauthorized access")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("database query failed"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidCredentials | ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
