//! Range-aware streaming of catalogued media files.
//!
//! The responder resolves an identifier through a `MediaLocator`, opens the
//! backing file through a `FileStore` and hands back either the whole file or
//! a single validated byte window. Every failure that can be detected before
//! the first byte is sent surfaces as a `StreamError`; read failures after
//! that point end the body stream instead.

use std::sync::Arc;

use tracing::{debug, warn};

use super::range::{ByteRange, RangeError, parse_range_header};
use crate::catalog::{CatalogError, MediaLocator};
use crate::media::{MediaId, MediaKind};
use crate::storage::{FileStore, ReadCursor, StorageError};

/// Outcome of a successful `respond` call, ready to be written to a client.
#[derive(Debug)]
pub struct StreamResult {
    pub kind: MediaKind,
    pub content_type: &'static str,
    /// Size of the whole file
    pub total_size: u64,
    /// Window being served, `None` for a full-content response
    pub range: Option<ByteRange>,
    pub body: ReadCursor,
}

impl StreamResult {
    /// Whether this is a 206 Partial Content response.
    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }

    /// Number of body bytes that will be sent.
    pub fn content_length(&self) -> u64 {
        self.range.map_or(self.total_size, |range| range.len())
    }

    /// `Content-Range` header value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        self.range.map(|range| range.content_range(self.total_size))
    }
}

/// Failures detected before any body bytes are sent.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Identifier is not a well-formed media id
    #[error("invalid {kind} identifier: {input:?}")]
    InvalidIdentifier { kind: MediaKind, input: String },

    /// No catalog entry, or the backing file is gone
    #[error("{kind} not found")]
    NotFound { kind: MediaKind },

    /// Range header cannot be served for a file of `total_size` bytes
    #[error("requested range not satisfiable ({source})")]
    RangeNotSatisfiable {
        total_size: u64,
        #[source]
        source: RangeError,
    },

    /// Opening or positioning the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves catalogued media files with HTTP byte-range semantics.
///
/// Holds no per-request state; any number of `respond` calls may run
/// concurrently for the same or different resources.
#[derive(Clone)]
pub struct RangeStreamResponder {
    locator: Arc<dyn MediaLocator>,
    store: Arc<dyn FileStore>,
    chunk_size: usize,
}

impl RangeStreamResponder {
    /// Creates a responder reading bodies in chunks of at most `chunk_size` bytes.
    pub fn new(
        locator: Arc<dyn MediaLocator>,
        store: Arc<dyn FileStore>,
        chunk_size: usize,
    ) -> Self {
        Self {
            locator,
            store,
            chunk_size,
        }
    }

    /// Resolves `resource_id` and prepares the response body.
    ///
    /// Without `range_header` the whole file is served. With one, exactly the
    /// requested inclusive window is served.
    ///
    /// # Errors
    ///
    /// - `StreamError::InvalidIdentifier` - `resource_id` is not a media id
    /// - `StreamError::NotFound` - Unknown id, no file of this kind, or file missing on disk
    /// - `StreamError::RangeNotSatisfiable` - Range is malformed or outside the file
    /// - `StreamError::Io` - File could not be opened or positioned
    pub async fn respond(
        &self,
        resource_id: &str,
        kind: MediaKind,
        range_header: Option<&str>,
    ) -> Result<StreamResult, StreamError> {
        let id: MediaId = resource_id
            .parse()
            .map_err(|_| StreamError::InvalidIdentifier {
                kind,
                input: resource_id.to_string(),
            })?;

        let resource = self.locator.locate(&id, kind).await.map_err(|e| match e {
            CatalogError::NotFound { .. } => StreamError::NotFound { kind },
            other => StreamError::Io(std::io::Error::other(other)),
        })?;

        let stored = self
            .store
            .open(&resource.file_path)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { path } => {
                    warn!(
                        "{} {} is catalogued but {} is missing",
                        kind.label(),
                        id,
                        path.display()
                    );
                    StreamError::NotFound { kind }
                }
                StorageError::Io(e) => StreamError::Io(e),
            })?;

        let total_size = stored.size();
        if total_size != resource.size_bytes {
            warn!(
                "{} {} size mismatch: catalog says {} bytes, file has {}",
                kind.label(),
                id,
                resource.size_bytes,
                total_size
            );
        }

        let result = match range_header {
            None => {
                debug!("Streaming full {} {} ({} bytes)", kind, id, total_size);
                StreamResult {
                    kind,
                    content_type: resource.content_type,
                    total_size,
                    range: None,
                    body: stored.into_full_cursor(self.chunk_size).await?,
                }
            }
            Some(header) => {
                let range = parse_range_header(header, total_size).map_err(|source| {
                    debug!("Rejecting range {:?} for {} {}: {}", header, kind, id, source);
                    StreamError::RangeNotSatisfiable { total_size, source }
                })?;

                debug!(
                    "Streaming {} {} range {}-{} of {}",
                    kind, id, range.start, range.end, total_size
                );
                StreamResult {
                    kind,
                    content_type: resource.content_type,
                    total_size,
                    range: Some(range),
                    body: stored.into_cursor(range, self.chunk_size).await?,
                }
            }
        };

        Ok(result)
    }

    /// Backend name of the underlying file store.
    pub fn store_type(&self) -> &'static str {
        self.store.store_type()
    }
}

impl std::fmt::Debug for RangeStreamResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeStreamResponder")
            .field("store", &self.store.store_type())
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}
