//! Complete streaming workflow over a live server.

use std::net::SocketAddr;

use lumina_core::config::LuminaConfig;
use lumina_core::storage::test_fixtures::{
    create_temp_uploads, patterned_bytes, video_record_on_disk,
};
use lumina_web::{AppState, build_router};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use tempfile::TempDir;
use tokio::net::TcpListener;

const VIDEO_SIZE: usize = 1000;

struct TestServer {
    _temp_dir: TempDir,
    address: SocketAddr,
    client: reqwest::Client,
    video_id: String,
    state: AppState,
}

impl TestServer {
    async fn start() -> Self {
        let (temp_dir, storage) = create_temp_uploads();
        let record = video_record_on_disk(&storage, "Sunset Timelapse", VIDEO_SIZE, Some(256));
        let video_id = record.id.to_string();

        let config = LuminaConfig::for_testing(temp_dir.path());
        let state = AppState::open(config).await.unwrap();
        state.catalog.insert(record).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            _temp_dir: temp_dir,
            address,
            client: reqwest::Client::new(),
            video_id,
            state,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    fn stream_url(&self) -> String {
        self.url(&format!("/api/videos/{}/stream", self.video_id))
    }

    async fn get_range(&self, range: &str) -> reqwest::Response {
        self.client
            .get(self.stream_url())
            .header(RANGE, range)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_full_download() {
    let server = TestServer::start().await;

    let response = server.client.get(server.stream_url()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "video/mp4");
    assert_eq!(response.headers()[CONTENT_LENGTH], "1000");
    assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
    assert!(response.headers().get(CONTENT_RANGE).is_none());
    let body = response.bytes().await.unwrap();
    assert_eq!(body.as_ref(), patterned_bytes(VIDEO_SIZE).as_slice());
}

#[tokio::test]
async fn test_bounded_range() {
    let server = TestServer::start().await;

    let response = server.get_range("bytes=0-499").await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 0-499/1000");
    assert_eq!(response.headers()[CONTENT_LENGTH], "500");
    assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
    let body = response.bytes().await.unwrap();
    assert_eq!(body.as_ref(), &patterned_bytes(VIDEO_SIZE)[..500]);
}

#[tokio::test]
async fn test_open_ended_range() {
    let server = TestServer::start().await;

    let response = server.get_range("bytes=500-").await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 500-999/1000");
    assert_eq!(response.headers()[CONTENT_LENGTH], "500");
    let body = response.bytes().await.unwrap();
    assert_eq!(body.as_ref(), &patterned_bytes(VIDEO_SIZE)[500..]);
}

#[tokio::test]
async fn test_range_past_end_is_rejected() {
    let server = TestServer::start().await;

    let response = server.get_range("bytes=900-1200").await;

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1000");
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["message"], "Requested range not satisfiable");
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let server = TestServer::start().await;

    for range in [None, Some("bytes=0-10")] {
        let mut request = server
            .client
            .get(server.url("/api/videos/000000000000000000000000/stream"));
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }
        let response = request.send().await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(CONTENT_RANGE).is_none());
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["message"], "Video not found");
    }
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/videos/12345/stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["message"], "Invalid Video ID");
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let server = TestServer::start().await;

    let first = server.get_range("bytes=123-456").await;
    let first_range = first.headers()[CONTENT_RANGE].clone();
    let first_body = first.bytes().await.unwrap();

    let second = server.get_range("bytes=123-456").await;
    assert_eq!(second.headers()[CONTENT_RANGE], first_range);
    assert_eq!(second.bytes().await.unwrap(), first_body);
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let server = TestServer::start().await;

    let response = server.client.head(server.stream_url()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_LENGTH], "1000");
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thumbnail_and_metadata() {
    let server = TestServer::start().await;

    let thumbnail = server
        .client
        .get(server.url(&format!("/api/videos/{}/thumbnail", server.video_id)))
        .header(RANGE, "bytes=0-15")
        .send()
        .await
        .unwrap();
    assert_eq!(thumbnail.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(thumbnail.headers()[CONTENT_TYPE], "image/jpeg");
    assert_eq!(thumbnail.headers()[CONTENT_RANGE], "bytes 0-15/256");

    let listing: serde_json::Value = server
        .client
        .get(server.url("/api/videos?category=education&search=sunset"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
    assert_eq!(listing[0]["id"], server.video_id);

    let categories: Vec<String> = server
        .client
        .get(server.url("/api/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories.first().map(String::as_str), Some("All"));
}

#[tokio::test]
async fn test_view_counter() {
    let server = TestServer::start().await;
    let view_url = server.url(&format!("/api/videos/{}/view", server.video_id));

    for expected in 1..=3 {
        let json: serde_json::Value = server
            .client
            .post(&view_url)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["views"], expected);
    }

    let id = server.video_id.parse().unwrap();
    assert_eq!(server.state.catalog.get(&id).map(|v| v.views), Some(3));
}

#[tokio::test]
async fn test_deleted_file_is_not_found() {
    let server = TestServer::start().await;
    let id = server.video_id.parse().unwrap();
    let record = server.state.catalog.get(&id).unwrap();
    std::fs::remove_file(&record.video_path).unwrap();

    let response = server.get_range("bytes=0-10").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
