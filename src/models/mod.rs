//! Domain models for the emote pipeline
//!
//! Upstream payloads are decoded into these strongly-typed records at the
//! directory boundary; nothing loosely-typed flows past `sources/`.

use serde::{Deserialize, Serialize};

/// Image MIME types offered by the upstream directory
///
/// Anything the directory reports outside this set is treated as PNG for
/// extension mapping purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmoteMime {
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/avif")]
    Avif,
    #[serde(rename = "image/png")]
    Png,
}

impl EmoteMime {
    /// File extension for stored blobs, `.png` as the fixed default
    pub fn extension(&self) -> &'static str {
        match self {
            EmoteMime::Webp => ".webp",
            EmoteMime::Gif => ".gif",
            EmoteMime::Avif => ".avif",
            EmoteMime::Png => ".png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            EmoteMime::Webp => "image/webp",
            EmoteMime::Gif => "image/gif",
            EmoteMime::Avif => "image/avif",
            EmoteMime::Png => "image/png",
        }
    }

    /// Parse a `image/*` content type, unknown types mapping to PNG
    pub fn from_content_type(value: &str) -> Self {
        match value {
            "image/webp" => EmoteMime::Webp,
            "image/gif" => EmoteMime::Gif,
            "image/avif" => EmoteMime::Avif,
            _ => EmoteMime::Png,
        }
    }

    /// Parse the bare format names the v3 trending API uses (`WEBP`, `GIF`, ...)
    pub fn from_upstream_format(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "WEBP" => EmoteMime::Webp,
            "GIF" => EmoteMime::Gif,
            "AVIF" => EmoteMime::Avif,
            _ => EmoteMime::Png,
        }
    }
}

/// One candidate encoded image offered upstream for an emote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub url: String,
    pub mime: EmoteMime,
    /// Frame count reported upstream; animated means more than one frame
    pub frame_count: u32,
    /// Resolution tier (1x..4x)
    pub scale: u32,
    pub byte_size: Option<u64>,
}

impl ImageVariant {
    pub fn animated(&self) -> bool {
        self.frame_count > 1
    }
}

/// An upstream emote record, immutable input to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteRecord {
    pub id: String,
    pub display_name: String,
    pub owner_name: Option<String>,
    pub variants: Vec<ImageVariant>,
}

/// A successfully ingested emote, never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEmote {
    pub file_name: String,
    #[serde(rename = "url")]
    pub storage_url: String,
    pub emote_id: String,
    pub emote_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub animated: bool,
    pub scale: u32,
    pub mime: String,
}

/// Trending lookup periods, wire values matching the upstream sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TrendingPeriod {
    #[serde(rename = "trending_daily")]
    Daily,
    #[default]
    #[serde(rename = "trending_weekly")]
    Weekly,
    #[serde(rename = "trending_monthly")]
    Monthly,
    #[serde(rename = "popularity")]
    AllTime,
}

impl TrendingPeriod {
    /// The upstream sort value, also used in cache fingerprints
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingPeriod::Daily => "trending_daily",
            TrendingPeriod::Weekly => "trending_weekly",
            TrendingPeriod::Monthly => "trending_monthly",
            TrendingPeriod::AllTime => "popularity",
        }
    }
}

impl std::fmt::Display for TrendingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
