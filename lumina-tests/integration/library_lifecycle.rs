//! Import and removal through `MediaLibrary`, observed by the streaming path.

use std::sync::Arc;

use futures::TryStreamExt;
use lumina_core::catalog::{MediaLocator, NewVideo, VideoFilter};
use lumina_core::config::StorageConfig;
use lumina_core::storage::test_fixtures::{patterned_bytes, write_media_file};
use lumina_core::{
    JsonCatalog, LocalFileStore, MediaKind, MediaLibrary, RangeStreamResponder, StreamError,
};

fn metadata(title: &str, category: &str) -> NewVideo {
    NewVideo {
        title: title.to_string(),
        description: format!("{title} walkthrough"),
        category: category.to_string(),
        duration_secs: 30,
    }
}

#[tokio::test]
async fn test_imported_video_streams_until_removed() {
    let root = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let video = write_media_file(sources.path(), "clip.mp4", &patterned_bytes(5000));

    let library = MediaLibrary::open(StorageConfig::rooted_at(root.path()))
        .await
        .unwrap();
    let record = library
        .import(&video, None, metadata("Clip", "Technology"))
        .await
        .unwrap();

    let responder = RangeStreamResponder::new(
        Arc::clone(library.catalog()) as Arc<dyn MediaLocator>,
        Arc::new(LocalFileStore::new()),
        1024,
    );
    let id = record.id.to_string();

    let result = responder
        .respond(&id, MediaKind::Video, Some("bytes=4000-"))
        .await
        .unwrap();
    let chunks: Vec<_> = result.body.try_collect().await.unwrap();
    assert_eq!(chunks.concat(), &patterned_bytes(5000)[4000..]);

    library.remove(&record.id).await.unwrap();
    assert!(matches!(
        responder.respond(&id, MediaKind::Video, None).await,
        Err(StreamError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_catalog_survives_reopen() {
    let root = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let storage = StorageConfig::rooted_at(root.path());

    let first = write_media_file(sources.path(), "a.mp4", &patterned_bytes(10));
    let second = write_media_file(sources.path(), "b.webm", &patterned_bytes(20));
    {
        let library = MediaLibrary::open(storage.clone()).await.unwrap();
        library
            .import(&first, None, metadata("Alpha", "Music"))
            .await
            .unwrap();
        library
            .import(&second, None, metadata("Beta", "Gaming"))
            .await
            .unwrap();
    }

    let reopened = JsonCatalog::open(&storage.catalog_path, storage.temp_file_suffix)
        .await
        .unwrap();
    assert_eq!(reopened.len(), 2);

    let music = reopened.list(&VideoFilter {
        category: Some("music".to_string()),
        search: None,
    });
    assert_eq!(music.len(), 1);
    assert_eq!(music[0].title, "Alpha");

    let searched = reopened.list(&VideoFilter {
        category: Some("All".to_string()),
        search: Some("BETA".to_string()),
    });
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].video_size, 20);
}
