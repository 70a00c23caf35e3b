//! JSON API handlers for the video catalog

use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use lumina_core::catalog::{CATEGORIES, VideoFilter};
use lumina_core::{MediaId, MediaKind, VideoRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Public representation of a catalogued video.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Absolute thumbnail URL, empty when the video has none
    pub thumbnail: String,
    pub video_url: String,
    pub views: u64,
    /// Seconds
    pub duration: u64,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl VideoView {
    pub fn from_record(record: &VideoRecord, base: &Url) -> Self {
        let thumbnail = if record.thumbnail_path.is_some() {
            media_url(base, &record.id, MediaKind::Thumbnail)
        } else {
            String::new()
        };

        Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            category: record.category.clone(),
            thumbnail,
            video_url: media_url(base, &record.id, MediaKind::Video),
            views: record.views,
            duration: record.duration_secs,
            size_bytes: record.video_size,
            created_at: record.created_at,
        }
    }
}

fn media_url(base: &Url, id: &MediaId, kind: MediaKind) -> String {
    let endpoint = match kind {
        MediaKind::Video => "stream",
        MediaKind::Thumbnail => "thumbnail",
    };
    base.join(&format!("api/videos/{id}/{endpoint}"))
        .map(String::from)
        .unwrap_or_default()
}

fn parse_video_id(raw: &str) -> Result<MediaId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId {
        kind: MediaKind::Video,
    })
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "videos": state.catalog.len(),
        "store": state.responder.store_type(),
    }))
}

/// `GET /api/categories`
pub async fn categories() -> Json<&'static [&'static str]> {
    Json(CATEGORIES)
}

/// `GET /api/videos?category=&search=`
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<VideoView>> {
    let filter = VideoFilter {
        category: query.category,
        search: query.search,
    };

    let videos = state
        .catalog
        .list(&filter)
        .iter()
        .map(|record| VideoView::from_record(record, &state.public_url))
        .collect();

    Json(videos)
}

/// `GET /api/videos/{id}`
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoView>, ApiError> {
    let id = parse_video_id(&id)?;
    let record = state.catalog.get(&id).ok_or(ApiError::NotFound {
        kind: MediaKind::Video,
    })?;

    Ok(Json(VideoView::from_record(&record, &state.public_url)))
}

/// `POST /api/videos/{id}/view`
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_video_id(&id)?;
    let views = state
        .catalog
        .record_view(&id)
        .await
        .map_err(|e| ApiError::from_catalog(e, "record view"))?;

    Ok(Json(json!({ "views": views })))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn record(thumbnail: Option<&str>) -> VideoRecord {
        VideoRecord {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap(),
            title: "Harbour Walk".to_string(),
            description: "Morning light".to_string(),
            category: "Travel".to_string(),
            video_path: PathBuf::from("/srv/uploads/videos/1.mp4"),
            video_size: 4096,
            thumbnail_path: thumbnail.map(PathBuf::from),
            thumbnail_size: 0,
            views: 3,
            duration_secs: 120,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_urls_are_absolute() {
        let base = Url::parse("https://cdn.example.com/lumina/").unwrap();
        let view = VideoView::from_record(&record(Some("/srv/t.jpg")), &base);

        assert_eq!(
            view.video_url,
            "https://cdn.example.com/lumina/api/videos/65a1f0c2e4b0a1b2c3d4e5f6/stream"
        );
        assert_eq!(
            view.thumbnail,
            "https://cdn.example.com/lumina/api/videos/65a1f0c2e4b0a1b2c3d4e5f6/thumbnail"
        );
    }

    #[test]
    fn test_view_without_thumbnail() {
        let base = Url::parse("http://localhost:5000/").unwrap();
        let view = VideoView::from_record(&record(None), &base);

        assert!(view.thumbnail.is_empty());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["sizeBytes"], 4096);
        assert_eq!(json["duration"], 120);
        assert!(json.get("videoUrl").is_some());
    }
}
