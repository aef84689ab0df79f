//! Storage listing endpoints
//!
//! Serve previously ingested emotes straight from the blob namespace,
//! without touching the upstream directory. Listings are sorted by name so
//! pagination is stable across requests.

use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::models::{EmoteMime, ProcessedEmote};
use crate::storage::StoredObject;
use crate::utils::pagination::paginate;
use crate::web::{AppState, responses::SearchResponse};

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Emotes ingested through search, listed from storage
pub async fn search_storage_listing(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Json<SearchResponse> {
    let folder = state.search_folder.clone();
    listing(state, folder, params).await
}

/// Emotes ingested through trending, listed from storage
pub async fn trending_storage_listing(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Json<SearchResponse> {
    let folder = state.trending_folder.clone();
    listing(state, folder, params).await
}

async fn listing(state: AppState, folder: String, params: ListingParams) -> Json<SearchResponse> {
    let start = Instant::now();

    if !(1..=100).contains(&params.limit) || params.page < 1 {
        return Json(SearchResponse::failure(
            "limit must be between 1 and 100 and page must be at least 1",
            params.page,
            params.limit,
        ));
    }

    let prefix = format!("{folder}/");
    // Store unavailability is fatal to a listing request, unlike during
    // batch ingestion where it only fails the item.
    let objects = match state.store.list_by_prefix(&prefix).await {
        Ok(objects) => objects,
        Err(err) => {
            let mut response = SearchResponse::failure(
                format!("Storage is not available: {err}"),
                params.page,
                params.limit,
            );
            response.processing_time = Some(start.elapsed().as_secs_f64());
            return Json(response);
        }
    };

    let mut response = build_listing_response(objects, &prefix, params.page, params.limit);
    response.processing_time = Some(start.elapsed().as_secs_f64());
    Json(response)
}

/// Turn a sorted blob listing into a response page.
fn build_listing_response(
    objects: Vec<StoredObject>,
    prefix: &str,
    page: u32,
    limit: u32,
) -> SearchResponse {
    let objects: Vec<StoredObject> = objects
        .into_iter()
        .filter(|o| {
            let file_name = o.name.strip_prefix(prefix).unwrap_or(&o.name);
            !file_name.is_empty() && !file_name.ends_with('/')
        })
        .collect();

    if objects.is_empty() {
        return SearchResponse::empty("No emotes found in storage", page, limit);
    }

    let slice = paginate(objects.len(), page, limit);
    if slice.out_of_range() {
        return SearchResponse::failure(
            format!(
                "Page {page} exceeds available pages (total: {})",
                slice.total_pages
            ),
            page,
            limit,
        );
    }

    let emotes = objects[slice.start..slice.end]
        .iter()
        .map(|object| stored_object_to_emote(object, prefix))
        .collect();
    SearchResponse::page_of(emotes, slice, page, limit)
}

fn stored_object_to_emote(object: &StoredObject, prefix: &str) -> ProcessedEmote {
    let file_name = object
        .name
        .strip_prefix(prefix)
        .unwrap_or(&object.name)
        .to_string();
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), ext.to_ascii_lowercase()),
        None => (file_name.clone(), String::new()),
    };
    let mime = match extension.as_str() {
        "webp" => EmoteMime::Webp,
        "gif" => EmoteMime::Gif,
        "avif" => EmoteMime::Avif,
        _ => EmoteMime::Png,
    };

    ProcessedEmote {
        file_name,
        storage_url: object.url.clone(),
        emote_id: storage_emote_id(&object.name),
        emote_name: stem,
        owner: None,
        // Listing has no variant metadata; GIF is the only extension that
        // implies animation.
        animated: mime == EmoteMime::Gif,
        scale: 1,
        mime: mime.content_type().to_string(),
    }
}

/// Stable synthetic id for blobs listed from storage
fn storage_emote_id(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let num = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) % 10_000_000;
    format!("storage_{num}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects(count: usize) -> Vec<StoredObject> {
        (0..count)
            .map(|i| StoredObject {
                name: format!("emote_api/emote{i:03}.webp"),
                url: format!("http://blobs.test/emote_api/emote{i:03}.webp"),
            })
            .collect()
    }

    #[test]
    fn pages_slice_the_sorted_listing() {
        let response = build_listing_response(objects(45), "emote_api/", 2, 20);
        assert!(response.success);
        assert_eq!(response.total_found, 45);
        assert_eq!(response.emotes.len(), 20);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_next_page);
        assert_eq!(response.emotes[0].file_name, "emote020.webp");
        assert_eq!(response.emotes[19].file_name, "emote039.webp");
    }

    #[test]
    fn page_past_the_end_is_a_failure_envelope() {
        let response = build_listing_response(objects(45), "emote_api/", 4, 20);
        assert!(!response.success);
        assert!(response.emotes.is_empty());
        assert_eq!(
            response.message.as_deref(),
            Some("Page 4 exceeds available pages (total: 3)")
        );
    }

    #[test]
    fn empty_listing_is_a_successful_empty_envelope() {
        let response = build_listing_response(Vec::new(), "emote_api/", 1, 20);
        assert!(response.success);
        assert_eq!(response.total_found, 0);
    }

    #[test]
    fn listing_entries_carry_derived_metadata() {
        let listing = vec![StoredObject {
            name: "trending_emotes/catJAM.gif".to_string(),
            url: "http://blobs.test/trending_emotes/catJAM.gif".to_string(),
        }];
        let response = build_listing_response(listing, "trending_emotes/", 1, 20);
        let emote = &response.emotes[0];
        assert_eq!(emote.emote_name, "catJAM");
        assert_eq!(emote.mime, "image/gif");
        assert!(emote.animated);
        assert!(emote.emote_id.starts_with("storage_"));
    }

    #[test]
    fn storage_ids_are_stable() {
        assert_eq!(
            storage_emote_id("emote_api/catJAM.webp"),
            storage_emote_id("emote_api/catJAM.webp")
        );
        assert_ne!(
            storage_emote_id("emote_api/catJAM.webp"),
            storage_emote_id("emote_api/other.webp")
        );
    }
}
