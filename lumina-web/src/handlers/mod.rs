//! HTTP request handlers organized by functionality

pub mod api;
pub mod streaming;

// Re-export handler functions
pub use api::{ListQuery, VideoView, categories, get_video, health, list_videos, record_view};
pub use streaming::{stream_thumbnail, stream_video};
