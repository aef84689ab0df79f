//! HTTP response envelopes
//!
//! All emote endpoints answer with the same `SearchResponse` envelope,
//! mirroring what gets cached: request-level failures are `success=false`
//! payloads with a readable message, not protocol-level errors, so clients
//! must check `success` before trusting the result.

use serde::{Deserialize, Serialize};

use crate::models::ProcessedEmote;
use crate::utils::pagination::PageSlice;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub total_found: usize,
    pub emotes: Vec<ProcessedEmote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_per_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

fn default_page() -> u32 {
    1
}

impl SearchResponse {
    /// Successful but empty result (no matches upstream or in storage)
    pub fn empty(message: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            success: true,
            total_found: 0,
            emotes: Vec::new(),
            message: Some(message.into()),
            cached: false,
            processing_time: None,
            page,
            total_pages: 0,
            results_per_page: Some(limit),
            has_next_page: false,
        }
    }

    /// Request-level failure payload
    pub fn failure(message: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            success: false,
            total_found: 0,
            emotes: Vec::new(),
            message: Some(message.into()),
            cached: false,
            processing_time: None,
            page,
            total_pages: 0,
            results_per_page: Some(limit),
            has_next_page: false,
        }
    }

    /// Successful page of results
    pub fn page_of(emotes: Vec<ProcessedEmote>, slice: PageSlice, page: u32, limit: u32) -> Self {
        Self {
            success: true,
            total_found: slice.total,
            emotes,
            message: None,
            cached: false,
            processing_time: None,
            page,
            total_pages: slice.total_pages,
            results_per_page: Some(limit),
            has_next_page: slice.has_next_page,
        }
    }
}
