use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// HTTP client seam for image downloads
///
/// The batch ingestor only ever needs "give me the bytes behind this URL",
/// so that is the whole trait; tests substitute an in-memory implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch URL and return the response body; non-2xx statuses are errors
    async fn fetch_bytes(&self, url: &str) -> AppResult<Vec<u8>>;
}

/// Default implementation of HttpClient using reqwest
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    pub fn new() -> Self {
        Self::with_connect_timeout(Duration::from_secs(10))
    }

    /// Create a client with only a connection timeout, leaving transfer
    /// time unbounded so large animated images are not cut off
    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for StandardHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for StandardHttpClient {
    async fn fetch_bytes(&self, url: &str) -> AppResult<Vec<u8>> {
        debug!("Fetching bytes from: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService {
                service: "cdn".to_string(),
                message: format!("HTTP {} for {}", response.status(), url),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
