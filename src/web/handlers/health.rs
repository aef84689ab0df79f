//! Health check endpoint

use axum::Json;
use serde_json::{Value, json};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "emote-proxy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
