//! Range handling over real files served through the JSON catalog.

use std::sync::Arc;

use futures::TryStreamExt;
use lumina_core::catalog::MediaLocator;
use lumina_core::storage::test_fixtures::{
    create_temp_uploads, patterned_bytes, video_record_on_disk,
};
use lumina_core::{
    ByteRange, JsonCatalog, LocalFileStore, MediaKind, RangeStreamResponder, StreamError,
    StreamResult,
};
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    responder: RangeStreamResponder,
    id: String,
}

async fn fixture(size: usize) -> Fixture {
    let (temp_dir, storage) = create_temp_uploads();
    let catalog = JsonCatalog::open(&storage.catalog_path, storage.temp_file_suffix)
        .await
        .unwrap();
    let record = video_record_on_disk(&storage, "Range", size, None);
    let id = record.id.to_string();
    catalog.insert(record).await.unwrap();

    let responder = RangeStreamResponder::new(
        Arc::new(catalog) as Arc<dyn MediaLocator>,
        Arc::new(LocalFileStore::new()),
        100,
    );

    Fixture {
        _temp_dir: temp_dir,
        responder,
        id,
    }
}

async fn collect(result: StreamResult) -> Vec<u8> {
    let chunks: Vec<_> = result.body.try_collect().await.unwrap();
    chunks.concat()
}

#[tokio::test]
async fn test_every_window_of_small_file_matches_disk() {
    let fixture = fixture(64).await;
    let expected = patterned_bytes(64);

    for start in (0..64).step_by(7) {
        for end in (start..64).step_by(5) {
            let header = format!("bytes={start}-{end}");
            let result = fixture
                .responder
                .respond(&fixture.id, MediaKind::Video, Some(&header))
                .await
                .unwrap();

            assert_eq!(result.range, Some(ByteRange::new(start as u64, end as u64)));
            assert_eq!(result.content_length(), (end - start + 1) as u64);
            assert_eq!(collect(result).await, &expected[start..=end]);
        }
    }
}

#[tokio::test]
async fn test_ranges_past_end_of_file_are_rejected() {
    let fixture = fixture(1000).await;

    for header in ["bytes=1000-", "bytes=900-1200", "bytes=500-400", "bytes=abc-"] {
        let result = fixture
            .responder
            .respond(&fixture.id, MediaKind::Video, Some(header))
            .await;
        assert!(
            matches!(
                result,
                Err(StreamError::RangeNotSatisfiable {
                    total_size: 1000,
                    ..
                })
            ),
            "{header} should be unsatisfiable"
        );
    }
}

#[tokio::test]
async fn test_suffix_range_serves_tail() {
    let fixture = fixture(1000).await;

    let result = fixture
        .responder
        .respond(&fixture.id, MediaKind::Video, Some("bytes=-100"))
        .await
        .unwrap();

    assert_eq!(result.content_range().as_deref(), Some("bytes 900-999/1000"));
    assert_eq!(collect(result).await, &patterned_bytes(1000)[900..]);
}

#[tokio::test]
async fn test_missing_thumbnail_is_not_found() {
    let fixture = fixture(10).await;

    let result = fixture
        .responder
        .respond(&fixture.id, MediaKind::Thumbnail, None)
        .await;
    assert!(matches!(
        result,
        Err(StreamError::NotFound {
            kind: MediaKind::Thumbnail
        })
    ));
}
