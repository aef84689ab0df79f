//! In-process TTL key-value store
//!
//! A single-instance deployment is assumed, so an in-memory index behind
//! `Arc<RwLock<_>>` is the backing store. Entries expire lazily: reads check
//! the deadline and purge on contact, and pattern operations drop expired
//! entries as they scan.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueCache, glob_to_regex};
use crate::errors::CacheError;

struct Entry {
    payload: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.live())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueCache for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.live() => return Ok(Some(entry.payload.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: purge under the write lock.
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            payload: value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize, CacheError> {
        let regex = glob_to_regex(pattern)?;
        let mut entries = self.entries.write().await;
        // Expired entries swept here do not count as matches.
        let removed = entries
            .iter()
            .filter(|(key, entry)| entry.live() && regex.is_match(key))
            .count();
        entries.retain(|key, entry| entry.live() && !regex.is_match(key));
        Ok(removed)
    }

    async fn count_matching(&self, pattern: &str) -> Result<usize, CacheError> {
        let regex = glob_to_regex(pattern)?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, entry)| entry.live() && regex.is_match(key))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheLayer;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = CacheLayer::new(Arc::new(MemoryKvStore::new()));
        cache
            .put("emote_search:cat:100:false:1", b"payload".to_vec(), Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.get("emote_search:cat:100:false:1").await,
            Some(b"payload".to_vec())
        );
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = MemoryKvStore::new();
        store
            .set("k", b"v".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn overwrite_replaces_payload_and_ttl() {
        let store = MemoryKvStore::new();
        store
            .set("k", b"old".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        store
            .set("k", b"new".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn clear_removes_only_matching_keys() {
        let store = Arc::new(MemoryKvStore::new());
        let cache = CacheLayer::new(store.clone());
        let ttl = Duration::from_secs(60);
        cache.put("emote_search:cat:100:false:1", b"a".to_vec(), ttl).await;
        cache.put("emote_search:dog:50:true:2", b"b".to_vec(), ttl).await;
        cache
            .put("trending:trending_weekly:20:1:false", b"c".to_vec(), ttl)
            .await;

        let removed = cache.clear(&["emote_search:*"]).await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("emote_search:cat:100:false:1").await.is_none());
        assert!(
            cache
                .get("trending:trending_weekly:20:1:false")
                .await
                .is_some()
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clear_with_multiple_patterns_sums_counts() {
        let cache = CacheLayer::new(Arc::new(MemoryKvStore::new()));
        let ttl = Duration::from_secs(60);
        cache.put("emote_search:a:1:false:1", b"a".to_vec(), ttl).await;
        cache
            .put("trending:trending_daily:20:1:false", b"b".to_vec(), ttl)
            .await;

        let removed = cache.clear(&["emote_search:*", "trending:*"]).await.unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn regex_metacharacters_in_patterns_are_literal() {
        let cache = CacheLayer::new(Arc::new(MemoryKvStore::new()));
        cache
            .put("emote_search:a", b"a".to_vec(), Duration::from_secs(60))
            .await;
        // `[` would be a regex error if it were not escaped during glob
        // translation; as a literal it simply matches nothing here.
        assert_eq!(cache.clear(&["emote_search:["]).await.unwrap(), 0);
    }
}
