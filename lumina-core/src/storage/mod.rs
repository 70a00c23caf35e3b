//! Storage layer for uploaded media files.
//!
//! Defines the read-only file store the streaming responder pulls bytes from,
//! with a local file system implementation. Files are opened once per request;
//! size and bytes are taken from the same handle.

pub mod cursor;
pub mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
pub use cursor::ReadCursor;
pub use local::LocalFileStore;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt};

use crate::streaming::ByteRange;

/// Seekable async byte source backing a stored file.
pub trait MediaReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> MediaReader for T {}

/// Read access to durable media storage.
///
/// Implementations must allow any number of concurrent opens of the same path;
/// files are never written through this interface.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Opens `path` for reading.
    ///
    /// # Errors
    ///
    /// - `StorageError::NotFound` - If nothing readable exists at `path`
    /// - `StorageError::Io` - If the file exists but could not be opened
    async fn open(&self, path: &Path) -> Result<StoredFile, StorageError>;

    /// Short name of the backend for diagnostics.
    fn store_type(&self) -> &'static str;
}

/// An opened file together with the length observed when it was opened.
pub struct StoredFile {
    reader: Box<dyn MediaReader>,
    size: u64,
}

impl StoredFile {
    /// Wraps an already opened reader of `size` bytes.
    pub fn new(reader: Box<dyn MediaReader>, size: u64) -> Self {
        Self { reader, size }
    }

    /// Total byte length of the file.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Turns the whole file into a read cursor.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` - If rewinding the reader fails
    pub async fn into_full_cursor(self, chunk_size: usize) -> std::io::Result<ReadCursor> {
        let size = self.size;
        self.into_window(0, size, chunk_size).await
    }

    /// Turns the inclusive byte window `range` into a read cursor.
    ///
    /// The range must already be validated against `size()`.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` - If seeking to `range.start` fails
    pub async fn into_cursor(
        self,
        range: ByteRange,
        chunk_size: usize,
    ) -> std::io::Result<ReadCursor> {
        debug_assert!(range.end < self.size);
        self.into_window(range.start, range.len(), chunk_size).await
    }

    async fn into_window(
        mut self,
        start: u64,
        length: u64,
        chunk_size: usize,
    ) -> std::io::Result<ReadCursor> {
        self.reader.seek(std::io::SeekFrom::Start(start)).await?;
        Ok(ReadCursor::new(self.reader, start, length, chunk_size))
    }
}

impl std::fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFile")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Errors that occur while opening stored media.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No file exists at the given path
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Standard I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
