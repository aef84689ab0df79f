//! Trending emotes endpoint

use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::debug;

use super::{MAX_UPSTREAM_FETCH, ingest_page};
use crate::cache::trending_fingerprint;
use crate::models::TrendingPeriod;
use crate::web::{AppState, responses::SearchResponse};

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    #[serde(default)]
    pub period: TrendingPeriod,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub animated_only: bool,
}

fn default_limit() -> u32 {
    20
}

fn default_page() -> u32 {
    1
}

/// Trending emotes with pagination, cached under the trending TTL.
///
/// The upstream API has no page parameter, so enough records for the
/// requested page are fetched (`page * limit`, capped) and sliced locally.
pub async fn trending_emotes(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Json<SearchResponse> {
    let start = Instant::now();

    if !(1..=100).contains(&params.limit) || params.page < 1 {
        return Json(SearchResponse::failure(
            "limit must be between 1 and 100 and page must be at least 1",
            params.page,
            params.limit,
        ));
    }

    let cache_key = trending_fingerprint(
        params.period,
        params.limit,
        params.page,
        params.animated_only,
    );
    if let Some(payload) = state.cache.get(&cache_key).await
        && let Ok(mut cached) = serde_json::from_slice::<SearchResponse>(&payload)
    {
        debug!("Cache hit for {}", cache_key);
        cached.cached = true;
        cached.processing_time = Some(start.elapsed().as_secs_f64());
        return Json(cached);
    }

    let fetch_limit = (params.page.saturating_mul(params.limit)).min(MAX_UPSTREAM_FETCH);
    let records = state
        .directory
        .trending(params.period, fetch_limit, params.animated_only)
        .await;

    let folder = state.trending_folder.clone();
    let mut response = ingest_page(
        &state,
        records,
        &folder,
        params.page,
        params.limit,
        &format!("No trending emotes found for period: {}", params.period),
    )
    .await;
    response.processing_time = Some(start.elapsed().as_secs_f64());

    if let Ok(payload) = serde_json::to_vec(&response) {
        state
            .cache
            .put(&cache_key, payload, state.trending_ttl)
            .await;
    }

    Json(response)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use axum::extract::State;

    use super::*;
    use crate::web::handlers::emotes::tests::{FixedDirectory, test_state};

    fn params() -> TrendingParams {
        TrendingParams {
            period: TrendingPeriod::Weekly,
            limit: 20,
            page: 1,
            animated_only: false,
        }
    }

    #[tokio::test]
    async fn cache_miss_stores_and_second_call_hits() {
        let directory = FixedDirectory::new();
        let state = test_state(directory.clone());

        let first = trending_emotes(State(state.clone()), Query(params()))
            .await
            .0;
        assert!(first.success);
        assert!(!first.cached);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
        let key = trending_fingerprint(TrendingPeriod::Weekly, 20, 1, false);
        assert!(state.cache.get(&key).await.is_some());

        let second = trending_emotes(State(state), Query(params())).await.0;
        assert!(second.cached);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_periods_do_not_share_entries() {
        let directory = FixedDirectory::new();
        let state = test_state(directory.clone());

        let weekly = trending_emotes(State(state.clone()), Query(params()))
            .await
            .0;
        let monthly = trending_emotes(
            State(state),
            Query(TrendingParams {
                period: TrendingPeriod::Monthly,
                ..params()
            }),
        )
        .await
        .0;

        assert!(!weekly.cached);
        assert!(!monthly.cached);
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }
}
