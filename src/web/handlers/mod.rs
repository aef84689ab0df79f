//! HTTP request handlers organized by domain

pub mod cache;
pub mod emotes;
pub mod health;
pub mod storage;
pub mod trending;

use crate::models::EmoteRecord;
use crate::utils::pagination::paginate;
use crate::web::{AppState, responses::SearchResponse};

/// Upper bound on what one request may pull from the upstream directory
pub(crate) const MAX_UPSTREAM_FETCH: u32 = crate::config::defaults::MAX_UPSTREAM_FETCH;

/// Shared fetch-page-and-ingest flow behind the search and trending routes.
///
/// `records` is the full upstream result set; the requested page is sliced
/// out of it, ingested, and wrapped with pagination metadata.
pub(crate) async fn ingest_page(
    state: &AppState,
    records: Vec<EmoteRecord>,
    folder: &str,
    page: u32,
    limit: u32,
    empty_message: &str,
) -> SearchResponse {
    if records.is_empty() {
        return SearchResponse::empty(empty_message, page, limit);
    }

    let slice = paginate(records.len(), page, limit);
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

    let page_records = records[slice.start..slice.end].to_vec();
    let emotes = state.ingestor.ingest(page_records, folder).await;
    SearchResponse::page_of(emotes, slice, page, limit)
}
