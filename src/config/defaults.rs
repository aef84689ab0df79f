/// Configuration default values
///
/// All defaults live here so they are changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Upstream directory defaults
pub const DEFAULT_SEARCH_URL: &str = "https://api.7tv.app/v4/gql";
pub const DEFAULT_TRENDING_URL: &str = "https://7tv.io/v3/gql";
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";

// Storage defaults
pub const DEFAULT_STORAGE_ROOT: &str = "./data/emotes";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/blobs";
pub const DEFAULT_SEARCH_FOLDER: &str = "emote_api";
pub const DEFAULT_TRENDING_FOLDER: &str = "trending_emotes";

// Cache defaults
pub const DEFAULT_SEARCH_TTL: &str = "24h";
pub const DEFAULT_TRENDING_TTL: &str = "6h";

// Ingestion defaults
/// Concurrency bound for per-emote pipeline tasks. This is the sole
/// backpressure mechanism for batch ingestion.
pub const DEFAULT_INGEST_CONCURRENCY: usize = 10;
pub const DEFAULT_CANVAS_WIDTH: u32 = 512;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 512;

// Upstream fetch cap: the trending API stops returning useful results
// past this many records.
pub const MAX_UPSTREAM_FETCH: u32 = 300;
