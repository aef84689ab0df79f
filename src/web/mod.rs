//! Web layer
//!
//! Thin axum handlers over the ingestion services. Handlers own the
//! cache-aside flow (fingerprint, read, compute, write) and the envelope
//! construction; everything else is delegated.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::CacheLayer;
use crate::config::Config;
use crate::ingestor::BatchIngestor;
use crate::sources::EmoteDirectory;
use crate::storage::ContentStore;

pub mod handlers;
pub mod responses;

pub use responses::SearchResponse;

/// Shared handler state, all collaborators injected at construction time
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn EmoteDirectory>,
    pub ingestor: Arc<BatchIngestor>,
    pub store: ContentStore,
    pub cache: CacheLayer,
    pub search_ttl: Duration,
    pub trending_ttl: Duration,
    pub search_folder: String,
    pub trending_folder: String,
    pub storage_root: PathBuf,
}

impl AppState {
    pub fn new(
        config: &Config,
        directory: Arc<dyn EmoteDirectory>,
        ingestor: Arc<BatchIngestor>,
        store: ContentStore,
        cache: CacheLayer,
    ) -> Self {
        Self {
            directory,
            ingestor,
            store,
            cache,
            search_ttl: config.cache.search_ttl,
            trending_ttl: config.cache.trending_ttl,
            search_folder: config.storage.search_folder.clone(),
            trending_folder: config.storage.trending_folder.clone(),
            storage_root: config.storage.root_dir.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // Stored blobs are served directly; the default public_base_url points
    // at this mount.
    let blobs = ServeDir::new(&state.storage_root);
    Router::new()
        .nest_service("/blobs", blobs)
        .route("/health", get(handlers::health::health_check))
        .route("/api/search-emotes", post(handlers::emotes::search_emotes))
        .route(
            "/api/trending/emotes",
            get(handlers::trending::trending_emotes),
        )
        .route(
            "/api/storage/emote-api",
            get(handlers::storage::search_storage_listing),
        )
        .route(
            "/api/storage/trending-emotes",
            get(handlers::storage::trending_storage_listing),
        )
        .route("/api/cache/status", get(handlers::cache::cache_status))
        .route("/api/cache/clear", post(handlers::cache::clear_cache))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
