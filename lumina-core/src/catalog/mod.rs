//! Video catalog: identifier lookup and the upload/delete lifecycle.
//!
//! The catalog stores only references to media (paths and sizes), never the
//! bytes themselves. Streaming reads the files on demand through a `FileStore`.

pub mod json_catalog;
pub mod library;

use std::path::PathBuf;

use async_trait::async_trait;
pub use json_catalog::{JsonCatalog, VideoFilter};
pub use library::{LibraryError, MediaLibrary, NewVideo};

use crate::media::{MediaId, MediaKind, MediaResource};

/// Categories a video can be filed under. `All` is only meaningful as a filter.
pub const CATEGORIES: &[&str] = &[
    "All",
    "Education",
    "Travel",
    "Food",
    "Fitness",
    "Technology",
    "Photography",
    "Music",
    "Gaming",
    "Entertainment",
];

/// Resolves media identifiers to files on durable storage.
#[async_trait]
pub trait MediaLocator: Send + Sync {
    /// Looks up the file of `kind` belonging to `id`.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` - Unknown id, or the record has no file of this kind
    async fn locate(&self, id: &MediaId, kind: MediaKind) -> Result<MediaResource, CatalogError>;
}

/// Errors raised by catalog lookups and persistence.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} {id} not found")]
    NotFound { kind: MediaKind, id: MediaId },

    #[error("video {id} already exists")]
    Duplicate { id: MediaId },

    #[error("catalog {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}
