//! Media identifiers and catalog documents.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of a media identifier in raw bytes.
pub const MEDIA_ID_LEN: usize = 12;

/// Opaque identifier of an uploaded video.
///
/// Rendered as 24 lowercase hex characters. The first four bytes carry the
/// creation time in unix seconds, the rest are random, so identifiers sort
/// roughly by upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId([u8; MEDIA_ID_LEN]);

impl MediaId {
    /// Creates an identifier from raw bytes.
    pub fn new(bytes: [u8; MEDIA_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MEDIA_ID_LEN];
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rng().fill(&mut bytes[4..]);
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; MEDIA_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Rejected identifier text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid media identifier: {input:?}")]
pub struct InvalidMediaId {
    pub input: String,
}

impl FromStr for MediaId {
    type Err = InvalidMediaId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMediaId {
            input: s.to_string(),
        };

        if s.len() != MEDIA_ID_LEN * 2 {
            return Err(invalid());
        }

        let mut bytes = [0u8; MEDIA_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl Serialize for MediaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MediaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Category of a stored file belonging to a video.
///
/// Each kind is served with a fixed content type regardless of the file's
/// actual extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Thumbnail,
}

impl MediaKind {
    /// MIME type sent in `Content-Type` for this kind.
    pub fn content_type(self) -> &'static str {
        match self {
            MediaKind::Video => "video/mp4",
            MediaKind::Thumbnail => "image/jpeg",
        }
    }

    /// Capitalized name used in client-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Thumbnail => "Thumbnail",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Thumbnail => f.write_str("thumbnail"),
        }
    }
}

/// Location and size of a servable file, as resolved by a `MediaLocator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResource {
    pub id: MediaId,
    pub kind: MediaKind,
    pub file_path: PathBuf,
    /// Size recorded at upload time
    pub size_bytes: u64,
    pub content_type: &'static str,
}

/// Catalog document describing one uploaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: MediaId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub video_path: PathBuf,
    pub video_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
    #[serde(default)]
    pub thumbnail_size: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub duration_secs: u64,
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Resolves the file backing `kind`, if this record has one.
    pub fn resource(&self, kind: MediaKind) -> Option<MediaResource> {
        let (file_path, size_bytes) = match kind {
            MediaKind::Video => (self.video_path.clone(), self.video_size),
            MediaKind::Thumbnail => (self.thumbnail_path.clone()?, self.thumbnail_size),
        };

        Some(MediaResource {
            id: self.id,
            kind,
            file_path,
            size_bytes,
            content_type: kind.content_type(),
        })
    }

    /// Whether the record matches a free-text search over title and description.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}
