//! Local file system store.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{FileStore, StorageError, StoredFile};

/// File store reading directly from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    /// Create new local file store
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn open(&self, path: &Path) -> Result<StoredFile, StorageError> {
        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }

        debug!("Opened {} ({} bytes)", path.display(), metadata.len());
        Ok(StoredFile::new(Box::new(file), metadata.len()))
    }

    fn store_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::streaming::ByteRange;

    #[tokio::test]
    async fn test_open_reports_size_and_reads_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let stored = LocalFileStore::new().open(&path).await.unwrap();
        assert_eq!(stored.size(), 10);

        let cursor = stored
            .into_cursor(ByteRange::new(3, 6), 2)
            .await
            .unwrap();
        let chunks: Vec<bytes::Bytes> = cursor.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"3456");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalFileStore::new().open(&dir.path().join("gone.mp4")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalFileStore::new().open(dir.path()).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }
}
