//! Emote search endpoint

use std::time::Instant;

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::debug;

use super::{MAX_UPSTREAM_FETCH, ingest_page};
use crate::cache::search_fingerprint;
use crate::web::{AppState, responses::SearchResponse};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub animated_only: bool,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_limit() -> u32 {
    100
}

fn default_page() -> u32 {
    1
}

/// Search 7TV, ingest the matching emotes into blob storage, and return
/// their references. Cache-aside over the full parameter fingerprint.
pub async fn search_emotes(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let start = Instant::now();

    if request.query.trim().is_empty() {
        return Json(SearchResponse::failure(
            "Query parameter is required",
            request.page,
            request.limit,
        ));
    }
    if !(1..=200).contains(&request.limit) || request.page < 1 {
        return Json(SearchResponse::failure(
            "limit must be between 1 and 200 and page must be at least 1",
            request.page,
            request.limit,
        ));
    }

    let cache_key = search_fingerprint(
        &request.query,
        request.limit,
        request.animated_only,
        request.page,
    );
    if let Some(payload) = state.cache.get(&cache_key).await
        && let Ok(mut cached) = serde_json::from_slice::<SearchResponse>(&payload)
    {
        debug!("Cache hit for {}", cache_key);
        cached.cached = true;
        cached.processing_time = Some(start.elapsed().as_secs_f64());
        return Json(cached);
    }

    let fetch_limit = (request.page.saturating_mul(request.limit)).min(MAX_UPSTREAM_FETCH);
    let records = state
        .directory
        .search(&request.query, fetch_limit, request.animated_only)
        .await;

    let folder = state.search_folder.clone();
    let mut response = ingest_page(
        &state,
        records,
        &folder,
        request.page,
        request.limit,
        "No emotes found for the given query",
    )
    .await;
    response.processing_time = Some(start.elapsed().as_secs_f64());

    if let Ok(payload) = serde_json::to_vec(&response) {
        state.cache.put(&cache_key, payload, state.search_ttl).await;
    }

    Json(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::extract::State;

    use crate::cache::{CacheLayer, MemoryKvStore};
    use crate::config::Config;
    use crate::errors::AppResult;
    use crate::ingestor::BatchIngestor;
    use crate::models::{EmoteMime, EmoteRecord, ImageVariant, TrendingPeriod};
    use crate::sources::EmoteDirectory;
    use crate::storage::{ContentStore, MemoryBlobBackend};
    use crate::utils::HttpClient;
    use crate::web::AppState;

    /// Always returns one emote and counts how often it was asked.
    pub(crate) struct FixedDirectory {
        pub calls: AtomicUsize,
    }

    impl FixedDirectory {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EmoteDirectory for FixedDirectory {
        async fn search(
            &self,
            _query: &str,
            _limit: u32,
            _animated_only: bool,
        ) -> Vec<EmoteRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![fixed_record()]
        }

        async fn trending(
            &self,
            _period: TrendingPeriod,
            _limit: u32,
            _animated_only: bool,
        ) -> Vec<EmoteRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![fixed_record()]
        }
    }

    struct FixedHttpClient;

    #[async_trait]
    impl HttpClient for FixedHttpClient {
        async fn fetch_bytes(&self, _url: &str) -> AppResult<Vec<u8>> {
            Ok(b"imagebytes".to_vec())
        }
    }

    fn fixed_record() -> EmoteRecord {
        EmoteRecord {
            id: "01H0".to_string(),
            display_name: "catJAM".to_string(),
            owner_name: None,
            variants: vec![ImageVariant {
                url: "https://cdn.test/1x.webp".to_string(),
                mime: EmoteMime::Webp,
                frame_count: 1,
                scale: 1,
                byte_size: None,
            }],
        }
    }

    pub(crate) fn test_state(directory: Arc<FixedDirectory>) -> AppState {
        let config = Config::default();
        let store = ContentStore::new(Arc::new(MemoryBlobBackend::new("http://blobs.test")));
        let ingestor = Arc::new(BatchIngestor::new(
            Arc::new(FixedHttpClient),
            store.clone(),
            &config.ingest,
        ));
        let cache = CacheLayer::new(Arc::new(MemoryKvStore::new()));
        AppState::new(&config, directory, ingestor, store, cache)
    }

    fn request() -> SearchRequest {
        SearchRequest {
            query: "cat".to_string(),
            limit: 20,
            animated_only: false,
            page: 1,
        }
    }

    #[tokio::test]
    async fn cache_miss_stores_and_second_call_hits() {
        let directory = FixedDirectory::new();
        let state = test_state(directory.clone());

        let first = search_emotes(State(state.clone()), Json(request())).await.0;
        assert!(first.success);
        assert!(!first.cached);
        assert_eq!(first.emotes.len(), 1);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
        // The miss wrote the fingerprint key.
        let key = search_fingerprint("cat", 20, false, 1);
        assert!(state.cache.get(&key).await.is_some());

        let second = search_emotes(State(state), Json(request())).await.0;
        assert!(second.success);
        assert!(second.cached);
        assert_eq!(second.emotes.len(), 1);
        // The hit never reached the upstream directory.
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_upstream_calls() {
        let directory = FixedDirectory::new();
        let state = test_state(directory.clone());

        let response = search_emotes(
            State(state),
            Json(SearchRequest {
                query: "   ".to_string(),
                ..request()
            }),
        )
        .await
        .0;

        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Query parameter is required")
        );
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }
}
