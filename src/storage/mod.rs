//! Blob storage layer
//!
//! `BlobBackend` is the narrow interface over the backing blob namespace;
//! `ContentStore` adds the idempotent upload-if-absent semantics the
//! ingestion pipeline relies on. Backends are injected at construction time
//! rather than held as process globals.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::StoreError;

pub mod content_store;
pub mod fs;
pub mod memory;

pub use content_store::ContentStore;
pub use fs::FsBlobBackend;
pub use memory::MemoryBlobBackend;

/// One stored blob, as exposed by prefix listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub name: String,
    pub url: String,
}

/// Minimal key/value-of-bytes store keyed by hierarchical names
/// (`folder/filename`)
#[async_trait]
pub trait BlobBackend: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Unconditional write; `ContentStore` layers the skip-if-exists check
    /// on top. Returns the public reference for the blob.
    async fn put(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<String, StoreError>;

    /// Names of all blobs under the prefix, in no particular order
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Public reference for a blob name
    fn url(&self, name: &str) -> String;
}
