//! HTTP server for the Lumina API
//!
//! Wires the catalog, file store and range responder into an axum router.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use lumina_core::catalog::MediaLocator;
use lumina_core::config::LuminaConfig;
use lumina_core::{JsonCatalog, LocalFileStore, LuminaError, MediaLibrary, RangeStreamResponder};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

use crate::handlers::{
    categories, get_video, health, list_videos, record_view, stream_thumbnail, stream_video,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub responder: RangeStreamResponder,
    pub catalog: Arc<JsonCatalog>,
    pub config: Arc<LuminaConfig>,
    /// Base for absolute media URLs, always ending in `/`
    pub public_url: Url,
}

impl AppState {
    /// Opens the catalog and prepares the upload directories for `config`.
    ///
    /// # Errors
    ///
    /// - `LuminaError::Configuration` - `public_url` is not a valid URL
    /// - `LuminaError::Library` - Catalog could not be loaded or directories created
    pub async fn open(config: LuminaConfig) -> Result<Self, LuminaError> {
        let public_url = parse_public_url(&config.server.public_url)?;
        let library = MediaLibrary::open(config.storage.clone()).await?;
        let catalog = Arc::clone(library.catalog());

        let responder = RangeStreamResponder::new(
            Arc::clone(&catalog) as Arc<dyn MediaLocator>,
            Arc::new(LocalFileStore::new()),
            config.streaming.chunk_size,
        );

        Ok(Self {
            responder,
            catalog,
            config: Arc::new(config),
            public_url,
        })
    }
}

fn parse_public_url(raw: &str) -> Result<Url, LuminaError> {
    let mut url = Url::parse(raw).map_err(|e| LuminaError::Configuration {
        reason: format!("invalid public url {raw:?}: {e}"),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Builds the API router with tracing and, if enabled, permissive CORS.
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/categories", get(categories))
        .route("/api/videos", get(list_videos))
        .route("/api/videos/{id}", get(get_video))
        .route("/api/videos/{id}/stream", get(stream_video))
        .route("/api/videos/{id}/thumbnail", get(stream_thumbnail))
        .route("/api/videos/{id}/view", post(record_view))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Runs the server until Ctrl-C.
///
/// # Errors
///
/// - Startup failures from `AppState::open`
/// - Binding or serving on `config.server.bind_address` fails
pub async fn run_server(config: LuminaConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind_address = config.server.bind_address;
    let state = AppState::open(config).await?;

    info!(
        "Catalog {} loaded with {} videos",
        state.catalog.path().display(),
        state.catalog.len()
    );

    let app = build_router(state);
    let listener = TcpListener::bind(bind_address).await?;
    info!("Lumina media server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
