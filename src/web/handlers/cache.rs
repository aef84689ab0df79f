//! Cache maintenance endpoints

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::web::AppState;

const SEARCH_PATTERN: &str = "emote_search:*";
const TRENDING_PATTERN: &str = "trending:*";

#[derive(Debug, Deserialize)]
pub struct ClearParams {
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
}

fn default_cache_type() -> String {
    "all".to_string()
}

/// Current cache key counts
pub async fn cache_status(State(state): State<AppState>) -> Json<Value> {
    let search = state.cache.count(SEARCH_PATTERN).await;
    let trending = state.cache.count(TRENDING_PATTERN).await;

    match (search, trending) {
        (Ok(search_keys), Ok(trending_keys)) => Json(json!({
            "status": "connected",
            "totalKeys": search_keys + trending_keys,
            "emoteSearchKeys": search_keys,
            "trendingKeys": trending_keys,
        })),
        (Err(err), _) | (_, Err(err)) => Json(json!({
            "status": "error",
            "message": err.to_string(),
        })),
    }
}

/// Clear cached responses by type (`all`, `search` or `trending`)
pub async fn clear_cache(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Json<Value> {
    let patterns: &[&str] = match params.cache_type.as_str() {
        "all" => &[SEARCH_PATTERN, TRENDING_PATTERN],
        "search" => &[SEARCH_PATTERN],
        "trending" => &[TRENDING_PATTERN],
        _ => {
            return Json(json!({
                "success": false,
                "message": "Invalid cache_type. Options are: all, search, trending",
            }));
        }
    };

    match state.cache.clear(patterns).await {
        Ok(removed) => Json(json!({
            "success": true,
            "message": format!("Cache cleared. {removed} entries removed."),
            "type": params.cache_type,
        })),
        Err(err) => Json(json!({
            "success": false,
            "message": format!("Error clearing cache: {err}"),
        })),
    }
}
