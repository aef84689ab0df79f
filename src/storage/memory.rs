//! In-memory blob backend
//!
//! Used by tests and local development; doubles as the reference
//! implementation of the `BlobBackend` contract, including a switch to
//! simulate backend unavailability.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::BlobBackend;
use crate::errors::StoreError;

pub struct MemoryBlobBackend {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    base_url: String,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryBlobBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            unavailable: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Simulate an unreachable backing store
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of physical writes performed
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .expect("blob map poisoned")
            .get(name)
            .cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable {
                message: "memory backend marked unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .objects
            .read()
            .expect("blob map poisoned")
            .contains_key(name))
    }

    async fn put(
        &self,
        name: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StoreError> {
        self.check_available()?;
        self.objects
            .write()
            .expect("blob map poisoned")
            .insert(name.to_string(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.url(name))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(self
            .objects
            .read()
            .expect("blob map poisoned")
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}
