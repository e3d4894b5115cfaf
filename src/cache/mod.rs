//! Response cache for remote sources
//!
//! Typing and deleting characters repeats the same requests; successful
//! responses are kept for a short time so they are answered locally.

use crate::config::CacheSettings;
use crate::results::SuggestionItem;
use moka::future::Cache;
use std::time::Duration;

/// Cache of parsed source responses
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, Vec<SuggestionItem>>,
}

impl ResponseCache {
    /// Create a new response cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Create a cache from settings, `None` when caching is disabled
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings
            .enabled
            .then(|| Self::new(settings.ttl, settings.max_capacity))
    }

    /// Get a cached response
    pub async fn get(&self, key: &str) -> Option<Vec<SuggestionItem>> {
        self.cache.get(key).await
    }

    /// Store a response
    pub async fn set(&self, key: String, items: Vec<SuggestionItem>) {
        self.cache.insert(key, items).await;
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache size
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(60, 1000)
    }
}

/// Generate a cache key for one source request
pub fn request_cache_key(source: &str, url: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update(url.as_bytes());

    format!("{:x}", hasher.finalize())
}
