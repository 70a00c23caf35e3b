//! Lumina Core - Media catalog and byte-range streaming
//!
//! This crate provides the building blocks behind Lumina's media endpoints:
//! the video catalog (a durable document store that maps identifiers to files
//! on disk), the local file store, HTTP range parsing and the responder that
//! turns a resource identifier plus an optional `Range` header into a
//! streamable body.

pub mod catalog;
pub mod config;
pub mod media;
pub mod storage;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use catalog::{CatalogError, JsonCatalog, LibraryError, MediaLibrary, MediaLocator};
pub use config::LuminaConfig;
pub use media::{MediaId, MediaKind, MediaResource, VideoRecord};
pub use storage::{FileStore, LocalFileStore, StorageError};
pub use streaming::{ByteRange, RangeStreamResponder, StreamError, StreamResult};

/// Core errors that can bubble up from any Lumina subsystem.
///
/// High-level error types representing failures in core functionality.
#[derive(Debug, thiserror::Error)]
pub enum LuminaError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LuminaError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            LuminaError::Catalog(CatalogError::NotFound { kind, id }) => {
                format!("{} {id} not found", kind.label())
            }
            LuminaError::Catalog(_) => "Catalog error occurred".to_string(),
            LuminaError::Library(LibraryError::InvalidMetadata { reason }) => {
                format!("Invalid video metadata: {reason}")
            }
            LuminaError::Library(LibraryError::UnsupportedMedia { path }) => {
                format!("Not a supported video file: {}", path.display())
            }
            LuminaError::Library(LibraryError::SourceNotFound { path }) => {
                format!("Source file not found: {}", path.display())
            }
            LuminaError::Library(LibraryError::Catalog(CatalogError::NotFound { kind, id })) => {
                format!("{} {id} not found", kind.label())
            }
            LuminaError::Library(_) => "Library error occurred".to_string(),
            LuminaError::Storage(_) => "Storage error occurred".to_string(),
            LuminaError::Streaming(e) => match e {
                StreamError::InvalidIdentifier { kind, .. } => {
                    format!("Invalid {} ID", kind.label())
                }
                StreamError::NotFound { kind } => format!("{} not found", kind.label()),
                StreamError::RangeNotSatisfiable { .. } => {
                    "Requested range not satisfiable".to_string()
                }
                StreamError::Io(_) => "Streaming error occurred".to_string(),
            },
            LuminaError::Configuration { reason } => format!("Configuration error: {reason}"),
            LuminaError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LuminaError::Configuration { .. }
                | LuminaError::Catalog(CatalogError::NotFound { .. })
                | LuminaError::Library(LibraryError::InvalidMetadata { .. })
                | LuminaError::Library(LibraryError::UnsupportedMedia { .. })
                | LuminaError::Library(LibraryError::SourceNotFound { .. })
                | LuminaError::Library(LibraryError::Catalog(CatalogError::NotFound { .. }))
                | LuminaError::Streaming(StreamError::InvalidIdentifier { .. })
                | LuminaError::Streaming(StreamError::RangeNotSatisfiable { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, LuminaError>;
