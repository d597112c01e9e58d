use glide_cache::document::{CacheStats, PageDocument, PagePolicy};
use glide_cache::fifo::FifoPages;
use glide_cache::lru::LruPages;
use parking_lot::Mutex;
use std::sync::Arc;

/// Type-erased policy behind the page cache.
enum PageCacheInner {
    Fifo(FifoPages),
    Lru(LruPages),
}

impl PageCacheInner {
    fn get(&mut self, key: &str) -> Option<Arc<PageDocument>> {
        match self {
            PageCacheInner::Fifo(c) => c.get(key),
            PageCacheInner::Lru(c) => c.get(key),
        }
    }

    fn contains(&self, key: &str) -> bool {
        match self {
            PageCacheInner::Fifo(c) => c.contains(key),
            PageCacheInner::Lru(c) => c.contains(key),
        }
    }

    fn insert(&mut self, key: String, value: Arc<PageDocument>) {
        match self {
            PageCacheInner::Fifo(c) => c.insert(key, value),
            PageCacheInner::Lru(c) => c.insert(key, value),
        }
    }

    fn clear(&mut self) {
        match self {
            PageCacheInner::Fifo(c) => c.clear(),
            PageCacheInner::Lru(c) => c.clear(),
        }
    }

    fn len(&self) -> usize {
        match self {
            PageCacheInner::Fifo(c) => c.len(),
            PageCacheInner::Lru(c) => c.len(),
        }
    }

    fn stats(&self) -> CacheStats {
        match self {
            PageCacheInner::Fifo(c) => c.stats(),
            PageCacheInner::Lru(c) => c.stats(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PageCacheInner::Fifo(c) => c.name(),
            PageCacheInner::Lru(c) => c.name(),
        }
    }
}

fn build_policy(policy: &str, capacity: usize) -> PageCacheInner {
    match policy {
        "fifo" => PageCacheInner::Fifo(FifoPages::new(capacity)),
        "lru" => PageCacheInner::Lru(LruPages::new(capacity)),
        other => panic!("unknown eviction policy: {other}"),
    }
}

/// The in-memory page cache shared between the controller's fetch paths.
///
/// Cheap to clone; clones share the same underlying store.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<Mutex<PageCacheInner>>,
}

impl PageCache {
    pub fn new(policy: &str, capacity: usize) -> Self {
        let inner = build_policy(policy, capacity);
        tracing::debug!(policy = inner.name(), capacity, "page cache initialized");
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<PageDocument>> {
        self.inner.lock().get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn insert(&self, key: String, value: Arc<PageDocument>) {
        self.inner.lock().insert(key, value);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn name(&self) -> &'static str {
        self.inner.lock().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::doc;

    #[test]
    fn policy_selection() {
        assert_eq!(PageCache::new("fifo", 10).name(), "FIFO");
        assert_eq!(PageCache::new("lru", 10).name(), "LRU");
    }

    #[test]
    #[should_panic(expected = "unknown eviction policy")]
    fn unknown_policy_panics() {
        PageCache::new("clock", 10);
    }

    #[test]
    fn clones_share_storage() {
        let cache = PageCache::new("fifo", 10);
        let clone = cache.clone();

        clone.insert("/a".into(), doc("/a"));
        assert!(cache.contains("/a"));
        assert_eq!(cache.len(), 1);
    }
}
