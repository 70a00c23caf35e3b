//! JSON error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_RANGE;
use axum::response::{IntoResponse, Response};
use lumina_core::{CatalogError, MediaKind, StreamError};
use serde_json::json;
use tracing::{error, warn};

/// Errors returned to API clients as `{ "message": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid {} ID", kind.label())]
    InvalidId { kind: MediaKind },

    #[error("{} not found", kind.label())]
    NotFound { kind: MediaKind },

    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable { total_size: u64 },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    /// Maps a streaming failure for `kind`, logging server-side faults.
    pub fn from_stream(error: StreamError, kind: MediaKind) -> Self {
        match error {
            StreamError::InvalidIdentifier { kind, .. } => ApiError::InvalidId { kind },
            StreamError::NotFound { kind } => ApiError::NotFound { kind },
            StreamError::RangeNotSatisfiable { total_size, .. } => {
                ApiError::RangeNotSatisfiable { total_size }
            }
            StreamError::Io(e) => {
                error!("Failed to stream {}: {}", kind, e);
                ApiError::Internal {
                    message: format!("Failed to stream {kind}"),
                }
            }
        }
    }

    /// Maps a catalog failure, logging anything other than a missing record.
    pub fn from_catalog(error: CatalogError, action: &str) -> Self {
        match error {
            CatalogError::NotFound { kind, .. } => ApiError::NotFound { kind },
            other => {
                error!("Failed to {}: {}", action, other);
                ApiError::Internal {
                    message: format!("Failed to {action}"),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!("{} {}", status.as_u16(), self);
        }
        let body = Json(json!({ "message": self.to_string() }));

        match self {
            ApiError::RangeNotSatisfiable { total_size } => (
                status,
                [(CONTENT_RANGE, format!("bytes */{total_size}"))],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
