//! Catalog persisted as a single JSON document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CatalogError, MediaLocator};
use crate::media::{MediaId, MediaKind, MediaResource, VideoRecord};

/// On-disk layout of the catalog file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    videos: Vec<VideoRecord>,
}

/// Filter for listing videos.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Case-insensitive category match; `"All"` or `None` matches everything
    pub category: Option<String>,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
}

impl VideoFilter {
    fn matches(&self, record: &VideoRecord) -> bool {
        let category_ok = match self.category.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(category) if category.eq_ignore_ascii_case("all") => true,
            Some(category) => record.category.eq_ignore_ascii_case(category),
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => record.matches_search(query),
        };
        category_ok && search_ok
    }
}

/// Durable video catalog backed by a JSON file.
///
/// The whole document is held in memory. Reads take a shared lock and never
/// wait on each other; each mutation rewrites the file through a temporary
/// sibling and a rename, so a crash leaves either the old or the new document.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    temp_suffix: &'static str,
    records: RwLock<HashMap<MediaId, VideoRecord>>,
    writer: tokio::sync::Mutex<()>,
}

impl JsonCatalog {
    /// Loads the catalog at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Corrupt` - File exists but is not a valid catalog document
    /// - `CatalogError::Io` - File could not be read
    pub async fn open(path: &Path, temp_suffix: &'static str) -> Result<Self, CatalogError> {
        let document = match tokio::fs::read(path).await {
            Ok(raw) => {
                serde_json::from_slice::<CatalogDocument>(&raw).map_err(|source| {
                    CatalogError::Corrupt {
                        path: path.to_path_buf(),
                        source,
                    }
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CatalogDocument::default(),
            Err(e) => return Err(CatalogError::Io(e)),
        };

        let records: HashMap<MediaId, VideoRecord> = document
            .videos
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        info!(
            "Loaded catalog {} with {} videos",
            path.display(),
            records.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            temp_suffix,
            records: RwLock::new(records),
            writer: tokio::sync::Mutex::new(()),
        })
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of catalogued videos.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the catalog holds no videos.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Fetches a single record.
    pub fn get(&self, id: &MediaId) -> Option<VideoRecord> {
        self.records.read().get(id).cloned()
    }

    /// Lists matching records, newest first.
    pub fn list(&self, filter: &VideoFilter) -> Vec<VideoRecord> {
        let mut videos: Vec<VideoRecord> = self
            .records
            .read()
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        videos
    }

    /// Adds a new record and persists the catalog.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Duplicate` - A record with the same id exists
    /// - `CatalogError::Io` / `CatalogError::Serialization` - Persisting failed; the insert is undone
    pub async fn insert(&self, record: VideoRecord) -> Result<(), CatalogError> {
        let _writer = self.writer.lock().await;
        let id = record.id;

        {
            let mut records = self.records.write();
            if records.contains_key(&id) {
                return Err(CatalogError::Duplicate { id });
            }
            records.insert(id, record);
        }

        if let Err(e) = self.persist().await {
            self.records.write().remove(&id);
            return Err(e);
        }

        debug!("Inserted video {}", id);
        Ok(())
    }

    /// Removes a record and persists the catalog, returning the removed record.
    ///
    /// Once this returns, lookups for `id` fail.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` - No such record
    /// - `CatalogError::Io` / `CatalogError::Serialization` - Persisting failed; the record is restored
    pub async fn remove(&self, id: &MediaId) -> Result<VideoRecord, CatalogError> {
        let _writer = self.writer.lock().await;

        let record = self
            .records
            .write()
            .remove(id)
            .ok_or(CatalogError::NotFound {
                kind: MediaKind::Video,
                id: *id,
            })?;

        if let Err(e) = self.persist().await {
            self.records.write().insert(*id, record);
            return Err(e);
        }

        debug!("Removed video {}", id);
        Ok(record)
    }

    /// Increments the view counter and returns the new count.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` - No such record
    /// - `CatalogError::Io` / `CatalogError::Serialization` - Persisting failed; the count is restored
    pub async fn record_view(&self, id: &MediaId) -> Result<u64, CatalogError> {
        let _writer = self.writer.lock().await;

        let views = {
            let mut records = self.records.write();
            let record = records.get_mut(id).ok_or(CatalogError::NotFound {
                kind: MediaKind::Video,
                id: *id,
            })?;
            record.views += 1;
            record.views
        };

        if let Err(e) = self.persist().await {
            if let Some(record) = self.records.write().get_mut(id) {
                record.views -= 1;
            }
            return Err(e);
        }

        Ok(views)
    }

    /// Writes the current document atomically. Callers hold `writer`.
    async fn persist(&self) -> Result<(), CatalogError> {
        let document = {
            let records = self.records.read();
            let mut videos: Vec<VideoRecord> = records.values().cloned().collect();
            videos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            CatalogDocument { videos }
        };
        let raw = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(self.temp_suffix);
        let temp_path = PathBuf::from(temp_path);

        tokio::fs::write(&temp_path, &raw).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaLocator for JsonCatalog {
    async fn locate(&self, id: &MediaId, kind: MediaKind) -> Result<MediaResource, CatalogError> {
        self.records
            .read()
            .get(id)
            .and_then(|record| record.resource(kind))
            .ok_or(CatalogError::NotFound { kind, id: *id })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn record(title: &str, category: &str, age_minutes: i64) -> VideoRecord {
        VideoRecord {
            id: MediaId::generate(),
            title: title.to_string(),
            description: format!("{title} description"),
            category: category.to_string(),
            video_path: PathBuf::from(format!("/uploads/videos/{title}.mp4")),
            video_size: 1000,
            thumbnail_path: None,
            thumbnail_size: 0,
            views: 0,
            duration_secs: 0,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalog::open(&dir.path().join("catalog.json"), ".tmp")
            .await
            .unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_insert_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");
        let video = record("Sunrise", "Travel", 0);

        let catalog = JsonCatalog::open(&path, ".tmp").await.unwrap();
        catalog.insert(video.clone()).await.unwrap();
        assert!(!dir.path().join("nested").join("catalog.json.tmp").exists());

        let reopened = JsonCatalog::open(&path, ".tmp").await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&video.id), Some(video));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalog::open(&dir.path().join("catalog.json"), ".tmp")
            .await
            .unwrap();
        let video = record("Sunrise", "Travel", 0);

        catalog.insert(video.clone()).await.unwrap();
        assert!(matches!(
            catalog.insert(video).await,
            Err(CatalogError::Duplicate { .. })
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_invalidates_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalog::open(&dir.path().join("catalog.json"), ".tmp")
            .await
            .unwrap();
        let video = record("Sunrise", "Travel", 0);
        catalog.insert(video.clone()).await.unwrap();

        assert!(catalog.locate(&video.id, MediaKind::Video).await.is_ok());
        catalog.remove(&video.id).await.unwrap();
        assert!(matches!(
            catalog.locate(&video.id, MediaKind::Video).await,
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            catalog.remove(&video.id).await,
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_locate_thumbnail_requires_path() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalog::open(&dir.path().join("catalog.json"), ".tmp")
            .await
            .unwrap();
        let mut video = record("Sunrise", "Travel", 0);
        catalog.insert(video.clone()).await.unwrap();
        assert!(catalog.locate(&video.id, MediaKind::Thumbnail).await.is_err());

        video.id = MediaId::generate();
        video.thumbnail_path = Some(PathBuf::from("/uploads/thumbnails/sunrise.jpg"));
        video.thumbnail_size = 20;
        catalog.insert(video.clone()).await.unwrap();
        let thumbnail = catalog
            .locate(&video.id, MediaKind::Thumbnail)
            .await
            .unwrap();
        assert_eq!(thumbnail.content_type, "image/jpeg");
        assert_eq!(thumbnail.size_bytes, 20);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonCatalog::open(&dir.path().join("catalog.json"), ".tmp")
            .await
            .unwrap();
        catalog.insert(record("Old trip", "Travel", 30)).await.unwrap();
        catalog.insert(record("New trip", "Travel", 1)).await.unwrap();
        catalog.insert(record("Pasta", "Food", 10)).await.unwrap();

        let all = catalog.list(&VideoFilter::default());
        let titles: Vec<&str> = all.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["New trip", "Pasta", "Old trip"]);

        let travel = catalog.list(&VideoFilter {
            category: Some("travel".to_string()),
            search: None,
        });
        assert_eq!(travel.len(), 2);

        let everything = catalog.list(&VideoFilter {
            category: Some("All".to_string()),
            search: Some("PASTA".to_string()),
        });
        assert_eq!(everything.len(), 1);
        assert_eq!(everything[0].title, "Pasta");
    }

    #[tokio::test]
    async fn test_record_view_increments_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = JsonCatalog::open(&path, ".tmp").await.unwrap();
        let video = record("Sunrise", "Travel", 0);
        catalog.insert(video.clone()).await.unwrap();

        assert_eq!(catalog.record_view(&video.id).await.unwrap(), 1);
        assert_eq!(catalog.record_view(&video.id).await.unwrap(), 2);

        let reopened = JsonCatalog::open(&path, ".tmp").await.unwrap();
        assert_eq!(reopened.get(&video.id).unwrap().views, 2);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            JsonCatalog::open(&path, ".tmp").await,
            Err(CatalogError::Corrupt { .. })
        ));
    }
}
