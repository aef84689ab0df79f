//! Upstream emote directory boundary
//!
//! The pipeline consumes the directory through `EmoteDirectory`; the 7TV
//! implementation lives in `seventv`. By contract the boundary returns an
//! empty sequence on any upstream failure. The failure is logged here, not
//! surfaced, so the core never has to distinguish "no results" from
//! "upstream down".

use async_trait::async_trait;

use crate::models::{EmoteRecord, TrendingPeriod};

pub mod seventv;

pub use seventv::SevenTvClient;

#[async_trait]
pub trait EmoteDirectory: Send + Sync {
    /// Search emotes by query text. Empty on upstream failure.
    async fn search(&self, query: &str, limit: u32, animated_only: bool) -> Vec<EmoteRecord>;

    /// Trending emotes for a period. Empty on upstream failure.
    async fn trending(
        &self,
        period: TrendingPeriod,
        limit: u32,
        animated_only: bool,
    ) -> Vec<EmoteRecord>;
}
