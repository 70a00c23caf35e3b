//! Upload and deletion of video files around the catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::{CATEGORIES, CatalogError, JsonCatalog};
use crate::config::StorageConfig;
use crate::media::{MediaId, VideoRecord};

/// Metadata supplied when importing a video.
#[derive(Debug, Clone, Default)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_secs: u64,
}

/// Errors raised while importing or removing videos.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("unsupported media file: {}", path.display())]
    UnsupportedMedia { path: PathBuf },

    #[error("source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the uploads directory layout and keeps it in step with the catalog.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    catalog: Arc<JsonCatalog>,
    storage: StorageConfig,
}

impl MediaLibrary {
    pub fn new(catalog: Arc<JsonCatalog>, storage: StorageConfig) -> Self {
        Self { catalog, storage }
    }

    /// Opens the catalog configured in `storage` and prepares the upload directories.
    ///
    /// # Errors
    ///
    /// - `LibraryError::Catalog` - Catalog file could not be loaded
    /// - `LibraryError::Io` - Upload directories could not be created
    pub async fn open(storage: StorageConfig) -> Result<Self, LibraryError> {
        let catalog = JsonCatalog::open(&storage.catalog_path, storage.temp_file_suffix).await?;
        let library = Self::new(Arc::new(catalog), storage);
        library.ensure_directories().await?;
        Ok(library)
    }

    pub fn catalog(&self) -> &Arc<JsonCatalog> {
        &self.catalog
    }

    /// Creates the uploads, videos and thumbnails directories if missing.
    ///
    /// # Errors
    ///
    /// - `std::io::Error` - A directory could not be created
    pub async fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            self.storage.uploads_dir.clone(),
            self.storage.videos_dir(),
            self.storage.thumbnails_dir(),
        ] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Copies a video (and optional thumbnail) into the uploads directory and
    /// catalogues it.
    ///
    /// # Errors
    ///
    /// - `LibraryError::InvalidMetadata` - Missing title, description or category, or unknown category
    /// - `LibraryError::UnsupportedMedia` - Video or thumbnail has the wrong file type
    /// - `LibraryError::SourceNotFound` - A source file does not exist
    /// - `LibraryError::Catalog` / `LibraryError::Io` - Copy or catalog update failed; copied files are removed
    pub async fn import(
        &self,
        video: &Path,
        thumbnail: Option<&Path>,
        metadata: NewVideo,
    ) -> Result<VideoRecord, LibraryError> {
        let metadata = validate_metadata(metadata)?;
        ensure_media_type(video, "video")?;
        if let Some(thumbnail) = thumbnail {
            ensure_media_type(thumbnail, "image")?;
        }

        let id = MediaId::generate();
        let stamp = Utc::now().timestamp_millis();

        let (video_path, video_size) = self
            .copy_into(video, &self.storage.videos_dir(), stamp, &id)
            .await?;

        let (thumbnail_path, thumbnail_size) = match thumbnail {
            Some(source) => {
                match self
                    .copy_into(source, &self.storage.thumbnails_dir(), stamp, &id)
                    .await
                {
                    Ok((path, size)) => (Some(path), size),
                    Err(e) => {
                        remove_if_present(&video_path).await;
                        return Err(e);
                    }
                }
            }
            None => (None, 0),
        };

        let record = VideoRecord {
            id,
            title: metadata.title,
            description: metadata.description,
            category: metadata.category,
            video_path,
            video_size,
            thumbnail_path,
            thumbnail_size,
            views: 0,
            duration_secs: metadata.duration_secs,
            created_at: Utc::now(),
        };

        if let Err(e) = self.catalog.insert(record.clone()).await {
            remove_if_present(&record.video_path).await;
            if let Some(path) = &record.thumbnail_path {
                remove_if_present(path).await;
            }
            return Err(e.into());
        }

        info!(
            "Imported video {} \"{}\" ({} bytes)",
            record.id, record.title, record.video_size
        );
        Ok(record)
    }

    /// Removes a video from the catalog, then deletes its files.
    ///
    /// Lookups fail as soon as the catalog entry is gone. Files that are
    /// already missing are ignored.
    ///
    /// # Errors
    ///
    /// - `LibraryError::Catalog` - Unknown id, or the catalog could not be persisted
    pub async fn remove(&self, id: &MediaId) -> Result<VideoRecord, LibraryError> {
        let record = self.catalog.remove(id).await?;

        remove_if_present(&record.video_path).await;
        if let Some(path) = &record.thumbnail_path {
            remove_if_present(path).await;
        }

        info!("Removed video {} \"{}\"", record.id, record.title);
        Ok(record)
    }

    async fn copy_into(
        &self,
        source: &Path,
        dir: &Path,
        stamp: i64,
        id: &MediaId,
    ) -> Result<(PathBuf, u64), LibraryError> {
        if !tokio::fs::try_exists(source).await? {
            return Err(LibraryError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let extension = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let destination = dir.join(format!("{stamp}-{id}{extension}"));

        tokio::fs::create_dir_all(dir).await?;
        let size = tokio::fs::copy(source, &destination).await?;
        Ok((destination, size))
    }
}

fn validate_metadata(metadata: NewVideo) -> Result<NewVideo, LibraryError> {
    let title = metadata.title.trim().to_string();
    let description = metadata.description.trim().to_string();
    let category = metadata.category.trim();

    if title.is_empty() || description.is_empty() || category.is_empty() {
        return Err(LibraryError::InvalidMetadata {
            reason: "Missing required fields: title, description, category".to_string(),
        });
    }

    let category = CATEGORIES
        .iter()
        .skip(1) // "All" is a filter, not a category
        .find(|known| known.eq_ignore_ascii_case(category))
        .ok_or_else(|| LibraryError::InvalidMetadata {
            reason: format!("Unknown category: {category}"),
        })?;

    Ok(NewVideo {
        title,
        description,
        category: (*category).to_string(),
        duration_secs: metadata.duration_secs,
    })
}

fn ensure_media_type(path: &Path, top_level: &str) -> Result<(), LibraryError> {
    let is_expected = mime_guess::from_path(path)
        .iter()
        .any(|mime| mime.type_() == top_level);
    if is_expected {
        Ok(())
    } else {
        Err(LibraryError::UnsupportedMedia {
            path: path.to_path_buf(),
        })
    }
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MediaLocator;
    use crate::media::MediaKind;

    async fn library_in(root: &Path) -> MediaLibrary {
        MediaLibrary::open(StorageConfig::rooted_at(root))
            .await
            .unwrap()
    }

    fn metadata() -> NewVideo {
        NewVideo {
            title: "  Knife Skills ".to_string(),
            description: "Dicing onions fast".to_string(),
            category: "food".to_string(),
            duration_secs: 95,
        }
    }

    #[tokio::test]
    async fn test_import_copies_and_catalogues() {
        let root = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        let video = sources.path().join("knife.MP4");
        let thumbnail = sources.path().join("knife.jpg");
        std::fs::write(&video, vec![1u8; 2048]).unwrap();
        std::fs::write(&thumbnail, vec![2u8; 64]).unwrap();

        let library = library_in(root.path()).await;
        let record = library
            .import(&video, Some(&thumbnail), metadata())
            .await
            .unwrap();

        assert_eq!(record.title, "Knife Skills");
        assert_eq!(record.category, "Food");
        assert_eq!(record.video_size, 2048);
        assert_eq!(record.thumbnail_size, 64);
        assert!(record.video_path.starts_with(root.path().join("videos")));
        assert!(record.video_path.to_string_lossy().ends_with(".mp4"));
        assert!(record.video_path.exists());

        let located = library
            .catalog()
            .locate(&record.id, MediaKind::Thumbnail)
            .await
            .unwrap();
        assert_eq!(Some(located.file_path), record.thumbnail_path);
    }

    #[tokio::test]
    async fn test_import_rejects_missing_fields() {
        let root = tempfile::tempdir().unwrap();
        let library = library_in(root.path()).await;

        let result = library
            .import(
                Path::new("/nowhere/clip.mp4"),
                None,
                NewVideo {
                    title: "   ".to_string(),
                    ..metadata()
                },
            )
            .await;
        assert!(matches!(result, Err(LibraryError::InvalidMetadata { .. })));
    }

    #[tokio::test]
    async fn test_import_rejects_unknown_category() {
        let root = tempfile::tempdir().unwrap();
        let library = library_in(root.path()).await;

        let result = library
            .import(
                Path::new("/nowhere/clip.mp4"),
                None,
                NewVideo {
                    category: "All".to_string(),
                    ..metadata()
                },
            )
            .await;
        assert!(matches!(result, Err(LibraryError::InvalidMetadata { .. })));
    }

    #[tokio::test]
    async fn test_import_rejects_non_video() {
        let root = tempfile::tempdir().unwrap();
        let library = library_in(root.path()).await;

        let result = library
            .import(Path::new("/nowhere/notes.txt"), None, metadata())
            .await;
        assert!(matches!(result, Err(LibraryError::UnsupportedMedia { .. })));
    }

    #[tokio::test]
    async fn test_import_reports_missing_source() {
        let root = tempfile::tempdir().unwrap();
        let library = library_in(root.path()).await;

        let result = library
            .import(&root.path().join("absent.mp4"), None, metadata())
            .await;
        assert!(matches!(result, Err(LibraryError::SourceNotFound { .. })));
        assert!(library.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_remove_deletes_record_then_files() {
        let root = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        let video = sources.path().join("clip.mp4");
        std::fs::write(&video, vec![9u8; 100]).unwrap();

        let library = library_in(root.path()).await;
        let record = library.import(&video, None, metadata()).await.unwrap();
        assert!(record.video_path.exists());

        library.remove(&record.id).await.unwrap();
        assert!(!record.video_path.exists());
        assert!(library.catalog().get(&record.id).is_none());
        assert!(matches!(
            library.remove(&record.id).await,
            Err(LibraryError::Catalog(CatalogError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_remove_tolerates_already_deleted_file() {
        let root = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        let video = sources.path().join("clip.mp4");
        std::fs::write(&video, vec![9u8; 100]).unwrap();

        let library = library_in(root.path()).await;
        let record = library.import(&video, None, metadata()).await.unwrap();
        std::fs::remove_file(&record.video_path).unwrap();

        assert!(library.remove(&record.id).await.is_ok());
    }
}
