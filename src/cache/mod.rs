//! Cache-aside layer over a TTL key-value store
//!
//! Response payloads are cached under deterministic fingerprints built from
//! every parameter that affects the result. Cache failures are never fatal:
//! the pipeline keeps working uncached, logging the degradation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use crate::errors::CacheError;
use crate::models::TrendingPeriod;

pub mod memory;

pub use memory::MemoryKvStore;

/// Minimal TTL-capable key/value store
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, overwriting unconditionally
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Delete every key matching the glob pattern, returning the count
    async fn delete_matching(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Count live keys matching the glob pattern
    async fn count_matching(&self, pattern: &str) -> Result<usize, CacheError>;
}

/// Fingerprint for a search request.
///
/// Every parameter that affects the result set is part of the key; the page
/// number is deliberately included so different pages of one query never
/// collide on a single entry.
pub fn search_fingerprint(query: &str, limit: u32, animated_only: bool, page: u32) -> String {
    format!("emote_search:{query}:{limit}:{animated_only}:{page}")
}

/// Fingerprint for a trending request
pub fn trending_fingerprint(
    period: TrendingPeriod,
    limit: u32,
    page: u32,
    animated_only: bool,
) -> String {
    format!("trending:{period}:{limit}:{page}:{animated_only}")
}

/// Compile a glob pattern (`*`, `?`) into an anchored regex
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex, CacheError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| CacheError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Cache-aside facade used by the request handlers.
///
/// `get`/`put` swallow backend failures (logged as warnings) so a broken
/// cache store degrades to uncached operation; `clear` propagates errors
/// because the caller explicitly asked for an invalidation.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn KeyValueCache>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn KeyValueCache>) -> Self {
        Self { store }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!("Cache read failed for {}: {}", key, err);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, payload: Vec<u8>, ttl: Duration) {
        if let Err(err) = self.store.set(key, payload, ttl).await {
            warn!("Cache write failed for {}: {}", key, err);
        }
    }

    /// Delete all keys matching any of the glob patterns, returning the
    /// total number removed
    pub async fn clear(&self, patterns: &[&str]) -> Result<usize, CacheError> {
        let mut removed = 0;
        for pattern in patterns {
            removed += self.store.delete_matching(pattern).await?;
        }
        Ok(removed)
    }

    pub async fn count(&self, pattern: &str) -> Result<usize, CacheError> {
        self.store.count_matching(pattern).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store whose every operation fails, as a dead Redis would.
    struct DownKvStore;

    #[async_trait]
    impl KeyValueCache for DownKvStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn delete_matching(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn count_matching(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn unavailable_store_degrades_to_uncached_reads_and_writes() {
        let cache = CacheLayer::new(Arc::new(DownKvStore));

        // get and put swallow the failure so request handling continues.
        assert_eq!(cache.get("emote_search:cat:100:false:1").await, None);
        cache
            .put(
                "emote_search:cat:100:false:1",
                b"payload".to_vec(),
                Duration::from_secs(60),
            )
            .await;

        // Explicit invalidation and counting do surface the failure.
        assert!(matches!(
            cache.clear(&["emote_search:*"]).await,
            Err(CacheError::Unavailable { .. })
        ));
        assert!(matches!(
            cache.count("emote_search:*").await,
            Err(CacheError::Unavailable { .. })
        ));
    }

    #[test]
    fn fingerprints_are_deterministic_and_distinct_per_page() {
        let a = search_fingerprint("cat", 100, false, 1);
        let b = search_fingerprint("cat", 100, false, 1);
        let c = search_fingerprint("cat", 100, false, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "emote_search:cat:100:false:1");
    }

    #[test]
    fn trending_fingerprint_includes_period_and_page() {
        let key = trending_fingerprint(TrendingPeriod::Weekly, 20, 3, true);
        assert_eq!(key, "trending:trending_weekly:20:3:true");
        assert_ne!(
            key,
            trending_fingerprint(TrendingPeriod::Monthly, 20, 3, true)
        );
        assert_ne!(
            key,
            trending_fingerprint(TrendingPeriod::Weekly, 20, 4, true)
        );
    }

    #[test]
    fn glob_matches_prefix_patterns() {
        let re = glob_to_regex("emote_search:*").unwrap();
        assert!(re.is_match("emote_search:cat:100:false:1"));
        assert!(!re.is_match("trending:trending_weekly:20:1:false"));

        let re = glob_to_regex("trending:?:x").unwrap();
        assert!(re.is_match("trending:a:x"));
        assert!(!re.is_match("trending:ab:x"));
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("emote_search:a.b+c:*").unwrap();
        assert!(re.is_match("emote_search:a.b+c:1"));
        assert!(!re.is_match("emote_search:aXb+c:1"));
    }
}
