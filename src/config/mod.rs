use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream emote directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// GraphQL endpoint for emote search (v4 API)
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// GraphQL endpoint for trending lookups (v3 API)
    #[serde(default = "default_trending_url")]
    pub trending_url: String,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the filesystem blob backend
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,
    /// Base URL under which stored blobs are publicly reachable
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Destination folder for search ingestions
    #[serde(default = "default_search_folder")]
    pub search_folder: String,
    /// Destination folder for trending ingestions
    #[serde(default = "default_trending_folder")]
    pub trending_folder: String,
}

/// Cache TTL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_search_ttl", with = "duration_serde::duration")]
    pub search_ttl: Duration,
    /// Trending data goes stale faster, so it gets a shorter TTL
    #[serde(default = "default_trending_ttl", with = "duration_serde::duration")]
    pub trending_ttl: Duration,
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Bound on concurrent per-emote pipeline tasks
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Normalized canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    /// Normalized canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    /// Optional byte budget for normalized images; encodes at decreasing
    /// quality steps until the output fits
    #[serde(default)]
    pub max_file_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}
fn default_trending_url() -> String {
    DEFAULT_TRENDING_URL.to_string()
}
fn default_connect_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_CONNECT_TIMEOUT).unwrap_or(Duration::from_secs(10))
}
fn default_storage_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_ROOT)
}
fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_string()
}
fn default_search_folder() -> String {
    DEFAULT_SEARCH_FOLDER.to_string()
}
fn default_trending_folder() -> String {
    DEFAULT_TRENDING_FOLDER.to_string()
}
fn default_search_ttl() -> Duration {
    humantime::parse_duration(DEFAULT_SEARCH_TTL).unwrap_or(Duration::from_secs(24 * 3600))
}
fn default_trending_ttl() -> Duration {
    humantime::parse_duration(DEFAULT_TRENDING_TTL).unwrap_or(Duration::from_secs(6 * 3600))
}
fn default_concurrency() -> usize {
    DEFAULT_INGEST_CONCURRENCY
}
fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}
fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            trending_url: default_trending_url(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
            public_base_url: default_public_base_url(),
            search_folder: default_search_folder(),
            trending_folder: default_trending_folder(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl: default_search_ttl(),
            trending_ttl: default_trending_ttl(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            max_file_bytes: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            upstream: UpstreamConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.ingest.concurrency, 10);
        assert_eq!(config.cache.search_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.cache.trending_ttl, Duration::from_secs(6 * 3600));
        assert_eq!(
            (config.ingest.canvas_width, config.ingest.canvas_height),
            (512, 512)
        );
        assert!(config.ingest.max_file_bytes.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [web]
            port = 9090

            [cache]
            trending_ttl = "30m"
            "#,
        )
        .unwrap();
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.host, DEFAULT_HOST);
        assert_eq!(config.cache.trending_ttl, Duration::from_secs(1800));
        assert_eq!(config.cache.search_ttl, Duration::from_secs(24 * 3600));
    }
}
