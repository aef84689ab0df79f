//! Idempotent, content-addressed-by-name upload semantics

use std::sync::Arc;

use tracing::debug;

use super::{BlobBackend, StoredObject};
use crate::errors::StoreError;

/// Upload-if-absent abstraction over a blob namespace.
///
/// Names are content-addressed: identical logical name implies identical
/// content, so an existence check stands in for content hashing. The
/// check-then-write is not atomic against concurrent writers of the same
/// name; two ingestions of an identical name may both write, last write
/// wins, which is harmless because content is stable per name.
#[derive(Clone)]
pub struct ContentStore {
    backend: Arc<dyn BlobBackend>,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self { backend }
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.backend.exists(name).await
    }

    /// Write `bytes` under `name` unless the name already exists, returning
    /// the blob reference either way.
    pub async fn put_if_absent(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        if self.backend.exists(name).await? {
            debug!("Blob {} already exists, skipping upload", name);
            return Ok(self.backend.url(name));
        }
        self.backend.put(name, bytes, content_type).await
    }

    /// All blobs under `prefix`, ordered by name for stable pagination
    pub async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        let mut names = self.backend.list(prefix).await?;
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| {
                let url = self.backend.url(&name);
                StoredObject { name, url }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobBackend;

    fn store() -> (ContentStore, Arc<MemoryBlobBackend>) {
        let backend = Arc::new(MemoryBlobBackend::new("http://blobs.test"));
        (ContentStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn put_if_absent_is_idempotent() {
        let (store, backend) = store();

        let first = store
            .put_if_absent("emote_api/catJAM.webp", b"first bytes", "image/webp")
            .await
            .unwrap();
        let second = store
            .put_if_absent("emote_api/catJAM.webp", b"different bytes", "image/webp")
            .await
            .unwrap();

        assert_eq!(first, second);
        // The second call was a no-op: original content survives.
        assert_eq!(
            backend.get("emote_api/catJAM.webp").await.unwrap(),
            b"first bytes".to_vec()
        );
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn listing_is_sorted_by_name() {
        let (store, _) = store();
        for name in ["emote_api/zebra.gif", "emote_api/apple.webp", "emote_api/mango.png"] {
            store.put_if_absent(name, b"x", "image/png").await.unwrap();
        }
        store
            .put_if_absent("trending_emotes/other.png", b"x", "image/png")
            .await
            .unwrap();

        let listed = store.list_by_prefix("emote_api/").await.unwrap();
        let names: Vec<_> = listed.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "emote_api/apple.webp",
                "emote_api/mango.png",
                "emote_api/zebra.gif"
            ]
        );
        assert!(listed[0].url.starts_with("http://blobs.test/"));
    }

    #[tokio::test]
    async fn unavailable_backend_propagates() {
        let backend = Arc::new(MemoryBlobBackend::new("http://blobs.test"));
        backend.set_unavailable(true);
        let store = ContentStore::new(backend);

        let err = store.exists("emote_api/x.png").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        let err = store.list_by_prefix("emote_api/").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
