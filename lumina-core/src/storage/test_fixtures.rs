//! Test fixtures for storage and streaming tests.
//!
//! Builds an uploads tree in a temporary directory and fills it with media
//! files whose bytes are predictable, so range responses can be checked
//! byte for byte.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::StorageConfig;
use crate::media::{MediaId, VideoRecord};

/// Deterministic content for a file of `len` bytes. Byte `i` is `i % 251`.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Creates a temporary directory with `videos/` and `thumbnails/` inside.
///
/// # Panics
///
/// Panics if the temporary directory or its subdirectories cannot be created.
pub fn create_temp_uploads() -> (tempfile::TempDir, StorageConfig) {
    let temp_dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig::rooted_at(temp_dir.path());

    std::fs::create_dir_all(storage.videos_dir()).unwrap();
    std::fs::create_dir_all(storage.thumbnails_dir()).unwrap();

    (temp_dir, storage)
}

/// Writes `contents` to `dir/name` and returns the full path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_media_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Writes a patterned video of `video_len` bytes (plus an optional thumbnail)
/// and returns a record pointing at them. The record is not inserted anywhere.
///
/// # Panics
///
/// Panics if the files cannot be written.
pub fn video_record_on_disk(
    storage: &StorageConfig,
    title: &str,
    video_len: usize,
    thumbnail_len: Option<usize>,
) -> VideoRecord {
    let id = MediaId::generate();
    let video_path = write_media_file(
        &storage.videos_dir(),
        &format!("{id}.mp4"),
        &patterned_bytes(video_len),
    );
    let thumbnail_path = thumbnail_len.map(|len| {
        write_media_file(
            &storage.thumbnails_dir(),
            &format!("{id}.jpg"),
            &patterned_bytes(len),
        )
    });

    VideoRecord {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        category: "Education".to_string(),
        video_path,
        video_size: video_len as u64,
        thumbnail_path,
        thumbnail_size: thumbnail_len.unwrap_or(0) as u64,
        views: 0,
        duration_secs: 60,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterned_bytes_wrap() {
        let bytes = patterned_bytes(600);
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[250], 250);
        assert_eq!(bytes[251], 0);
        assert_eq!(bytes.len(), 600);
    }

    #[test]
    fn test_record_on_disk_matches_files() {
        let (_temp_dir, storage) = create_temp_uploads();
        let record = video_record_on_disk(&storage, "Clip", 4096, Some(128));

        assert_eq!(
            std::fs::metadata(&record.video_path).unwrap().len(),
            record.video_size
        );
        let thumbnail = record.thumbnail_path.unwrap();
        assert_eq!(std::fs::metadata(thumbnail).unwrap().len(), 128);
    }
}
