//! Caching layer for upstream departure responses.
//!
//! The display and HTTP surfaces may poll far more often than the upstream
//! data changes, so raw responses are kept for a short TTL. Entries are
//! keyed by identity marker; selection always runs fresh on top of them so
//! relative display times stay current.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::RawDeparture;

/// Cached raw response for one marker.
pub type BoardEntry = Arc<Vec<RawDeparture>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 16,
        }
    }
}

/// Cache for upstream departure responses.
pub struct ResponseCache {
    boards: MokaCache<String, BoardEntry>,
}

impl ResponseCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { boards }
    }

    pub async fn get(&self, marker: &str) -> Option<BoardEntry> {
        self.boards.get(marker).await
    }

    pub async fn insert(&self, marker: String, entry: BoardEntry) {
        self.boards.insert(marker, entry).await;
    }

    /// Approximate entry count (for logging).
    pub fn entry_count(&self) -> u64 {
        self.boards.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.boards.invalidate_all();
    }
}
