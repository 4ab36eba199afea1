//! Cache storage port.
//!
//! The core only requires cache-aside get/put over opaque payloads; expiry,
//! if any, belongs to the deployed store behind the trait.

use bytes::Bytes;
use dashmap::DashMap;

/// Key/value store keyed by opaque strings.
///
/// Gets and puts are individually atomic. Entries are immutable once written
/// under a given key, so last-writer-wins on overlapping misses costs
/// duplicate work, never corruption.
pub trait CachePort: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn put(&self, key: &str, value: Bytes);
}

/// Process-local cache over a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Bytes>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CachePort for InMemoryCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        match self.entries.get(key) {
            Some(entry) => {
                metrics::counter!("lorekeeper_cache_hit_total").increment(1);
                Some(entry.value().clone())
            }
            None => {
                metrics::counter!("lorekeeper_cache_miss_total").increment(1);
                None
            }
        }
    }

    fn put(&self, key: &str, value: Bytes) {
        self.entries.insert(key.to_owned(), value);
    }
}
