//! Byte-range streaming of videos and thumbnails.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use lumina_core::{MediaKind, StreamResult};

use crate::error::ApiError;
use crate::server::AppState;

/// `GET /api/videos/{id}/stream`
pub async fn stream_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    stream_media(&state, &id, MediaKind::Video, &headers).await
}

/// `GET /api/videos/{id}/thumbnail`
pub async fn stream_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    stream_media(&state, &id, MediaKind::Thumbnail, &headers).await
}

async fn stream_media(
    state: &AppState,
    id: &str,
    kind: MediaKind,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    // A header that is not visible ASCII can never be a valid range
    let range = headers
        .get(RANGE)
        .map(|value| value.to_str().unwrap_or_default());

    let result = state
        .responder
        .respond(id, kind, range)
        .await
        .map_err(|e| ApiError::from_stream(e, kind))?;

    build_stream_response(result)
}

/// Turns a prepared stream into a 200 or 206 response with a streaming body.
fn build_stream_response(result: StreamResult) -> Result<Response, ApiError> {
    let status = if result.is_partial() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, result.content_type)
        .header(CONTENT_LENGTH, result.content_length())
        .header(ACCEPT_RANGES, "bytes");

    if let Some(content_range) = result.content_range() {
        builder = builder.header(CONTENT_RANGE, content_range);
    }

    let kind = result.kind;
    builder
        .body(Body::from_stream(result.body))
        .map_err(|e| {
            tracing::error!("Failed to build {} response: {}", kind, e);
            ApiError::Internal {
                message: format!("Failed to stream {kind}"),
            }
        })
}
