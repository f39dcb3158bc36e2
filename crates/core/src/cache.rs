//! In-memory feed page cache.
//!
//! Caches rendered index feed pages keyed by page number with a fixed TTL.
//! Invalidation is purely time-based: writes do not evict entries, so a new
//! post may not appear in the index feed until the cached page expires.

use quill_db::entities::post;
use quill_db::pagination::Page;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

struct CacheEntry {
    inserted_at: Instant,
    page: Page<post::Model>,
}

/// Process-wide cache for index feed pages.
#[derive(Clone)]
pub struct FeedCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<u64, CacheEntry>>>,
}

impl FeedCache {
    /// Create a cache with the given entry TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up a cached page. Expired entries count as misses.
    #[must_use]
    pub fn get(&self, page_number: u64) -> Option<Page<post::Model>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&page_number)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.page.clone())
    }

    /// Store a page, replacing any previous entry for the same number.
    pub fn insert(&self, page_number: u64, page: Page<post::Model>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                page_number,
                CacheEntry {
                    inserted_at: Instant::now(),
                    page,
                },
            );
        }
    }

}
