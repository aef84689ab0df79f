//! 7TV GraphQL client
//!
//! Search goes through the v4 API, trending through the v3 API (the v4 API
//! has no trending sort yet). Payloads are decoded into typed structs at
//! this boundary; anything that fails to decode is an upstream error and
//! yields an empty result.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::EmoteDirectory;
use crate::config::UpstreamConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{EmoteMime, EmoteRecord, ImageVariant, TrendingPeriod};

const SEARCH_QUERY: &str = r#"
query EmoteSearch($query: String, $tags: [String!]!, $sortBy: SortBy!, $filters: Filters, $page: Int, $perPage: Int!, $isDefaultSetSet: Boolean!, $defaultSetId: Id!) {
  emotes {
    search(
      query: $query
      tags: { tags: $tags, match: ANY }
      sort: { sortBy: $sortBy, order: DESCENDING }
      filters: $filters
      page: $page
      perPage: $perPage
    ) {
      items {
        id
        defaultName
        owner {
          mainConnection {
            platformDisplayName
          }
        }
        images {
          url
          mime
          size
          scale
          frameCount
        }
        inEmoteSets(emoteSetIds: [$defaultSetId]) @include(if: $isDefaultSetSet) {
          emoteSetId
        }
      }
      totalCount
      pageCount
    }
  }
}
"#;

const TRENDING_QUERY: &str = r#"
query GetTrendingEmotes($limit: Int, $filter: EmoteSearchFilter, $period: String!) {
  emotes(query: "", limit: $limit, filter: $filter, sort: { value: $period, order: DESCENDING }) {
    items {
      id
      name
      animated
      host {
        url
        files {
          name
          format
          width
          height
        }
      }
    }
  }
}
"#;

pub struct SevenTvClient {
    client: reqwest::Client,
    search_url: String,
    trending_url: String,
}

impl SevenTvClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            search_url: config.search_url.clone(),
            trending_url: config.trending_url.clone(),
        }
    }

    async fn post_graphql<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        payload: serde_json::Value,
    ) -> AppResult<T> {
        let response = self.client.post(url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(AppError::upstream_error(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let envelope: GraphQlEnvelope<T> = response.json().await?;
        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            return Err(AppError::upstream_error(format!(
                "GraphQL errors: {}",
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }
        envelope
            .data
            .ok_or_else(|| AppError::upstream_error("response carried no data".to_string()))
    }

    async fn search_inner(
        &self,
        query: &str,
        limit: u32,
        animated_only: bool,
    ) -> AppResult<Vec<EmoteRecord>> {
        let payload = json!({
            "query": SEARCH_QUERY,
            "variables": {
                "defaultSetId": "",
                "filters": { "animated": animated_only },
                "isDefaultSetSet": false,
                "page": 1,
                "perPage": limit,
                "query": query,
                "sortBy": "TOP_ALL_TIME",
                "tags": [],
            },
        });

        let data: SearchData = self.post_graphql(&self.search_url, payload).await?;
        Ok(map_search_items(data.emotes.search.items))
    }

    async fn trending_inner(
        &self,
        period: TrendingPeriod,
        limit: u32,
        animated_only: bool,
    ) -> AppResult<Vec<EmoteRecord>> {
        let payload = json!({
            "query": TRENDING_QUERY,
            "variables": {
                "limit": limit,
                "filter": { "animated": (if animated_only { Some(true) } else { None::<bool> }) },
                "period": period.as_str(),
            },
        });

        let data: TrendingData = self.post_graphql(&self.trending_url, payload).await?;
        Ok(map_trending_items(data.emotes.items))
    }
}

#[async_trait]
impl EmoteDirectory for SevenTvClient {
    async fn search(&self, query: &str, limit: u32, animated_only: bool) -> Vec<EmoteRecord> {
        match self.search_inner(query, limit, animated_only).await {
            Ok(records) => records,
            Err(err) => {
                error!("7TV search failed for '{}': {}", query, err);
                Vec::new()
            }
        }
    }

    async fn trending(
        &self,
        period: TrendingPeriod,
        limit: u32,
        animated_only: bool,
    ) -> Vec<EmoteRecord> {
        match self.trending_inner(period, limit, animated_only).await {
            Ok(records) => records,
            Err(err) => {
                error!("7TV trending lookup failed for {}: {}", period, err);
                Vec::new()
            }
        }
    }
}

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct SearchData {
    emotes: SearchEmotes,
}

#[derive(Deserialize)]
struct SearchEmotes {
    search: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: String,
    default_name: String,
    owner: Option<SearchOwner>,
    #[serde(default)]
    images: Vec<SearchImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchOwner {
    main_connection: Option<SearchConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConnection {
    platform_display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchImage {
    url: String,
    mime: String,
    size: Option<u64>,
    scale: Option<u32>,
    frame_count: Option<u32>,
}

#[derive(Deserialize)]
struct TrendingData {
    emotes: TrendingEmotes,
}

#[derive(Deserialize)]
struct TrendingEmotes {
    items: Vec<TrendingItem>,
}

#[derive(Deserialize)]
struct TrendingItem {
    id: String,
    name: String,
    #[serde(default)]
    animated: bool,
    host: TrendingHost,
}

#[derive(Deserialize)]
struct TrendingHost {
    url: String,
    #[serde(default)]
    files: Vec<TrendingFile>,
}

#[derive(Deserialize)]
struct TrendingFile {
    name: String,
    format: String,
}

fn map_search_items(items: Vec<SearchItem>) -> Vec<EmoteRecord> {
    items
        .into_iter()
        .map(|item| EmoteRecord {
            id: item.id,
            display_name: item.default_name,
            owner_name: item
                .owner
                .and_then(|o| o.main_connection)
                .and_then(|c| c.platform_display_name),
            variants: item
                .images
                .into_iter()
                .map(|image| ImageVariant {
                    url: image.url,
                    mime: EmoteMime::from_content_type(&image.mime),
                    frame_count: image.frame_count.unwrap_or(1).max(1),
                    scale: image.scale.unwrap_or(1).max(1),
                    byte_size: image.size,
                })
                .collect(),
        })
        .collect()
}

fn map_trending_items(items: Vec<TrendingItem>) -> Vec<EmoteRecord> {
    items
        .into_iter()
        .map(|item| {
            // Protocol-relative CDN urls are the norm in the v3 API.
            let base = if item.host.url.starts_with("//") {
                format!("https:{}", item.host.url)
            } else {
                item.host.url.clone()
            };
            let frame_count = if item.animated { 2 } else { 1 };
            let variants = item
                .host
                .files
                .into_iter()
                .map(|file| ImageVariant {
                    url: format!("{}/{}", base.trim_end_matches('/'), file.name),
                    mime: EmoteMime::from_upstream_format(&file.format),
                    frame_count,
                    scale: scale_from_file_name(&file.name),
                    byte_size: None,
                })
                .collect();
            EmoteRecord {
                id: item.id,
                display_name: item.name,
                owner_name: None,
                variants,
            }
        })
        .collect()
}

/// Resolution tier from v3 file names (`1x.webp` .. `4x.gif`)
fn scale_from_file_name(name: &str) -> u32 {
    name.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|scale| (1..=4).contains(scale))
        .unwrap_or(1)
}
