use crate::arena::{Arena, Node};
use crate::document::{CacheStats, PageDocument, PagePolicy};
use std::collections::HashMap;
use std::sync::Arc;

/// LRU (Least Recently Used) page eviction.
///
/// On every cache hit, the accessed node is moved to the head of the list.
/// Evictions happen from the tail (least recently used). Selectable through
/// config for storefronts where shoppers bounce between a few hub pages.
pub struct LruPages {
    arena: Arena,
    map: HashMap<String, u32, ahash::RandomState>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl LruPages {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be > 0");
        Self {
            arena: Arena::new(capacity),
            map: HashMap::with_capacity_and_hasher(capacity, ahash::RandomState::default()),
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }
}

impl PagePolicy for LruPages {
    fn get(&mut self, key: &str) -> Option<Arc<PageDocument>> {
        if let Some(&index) = self.map.get(key) {
            self.hits += 1;
            // LRU: promote to head on every access
            self.arena.move_to_head(index);
            let node = self.arena.get(index).unwrap();
            Some(Arc::clone(&node.value))
        } else {
            self.misses += 1;
            None
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn insert(&mut self, key: String, value: Arc<PageDocument>) {
        // If key already exists, remove old entry first
        if let Some(&old_index) = self.map.get(&key) {
            self.arena.remove(old_index);
            self.map.remove(&key);
        }

        // Evict LRU (tail) if at capacity
        while self.arena.len() >= self.capacity {
            if let Some((_, evicted)) = self.arena.pop_tail() {
                self.map.remove(&evicted.key);
                self.evictions += 1;
            } else {
                break;
            }
        }

        let node = Node::new(key.clone(), value);
        if let Some(index) = self.arena.push_head(node) {
            self.map.insert(key, index);
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        if let Some(index) = self.map.remove(key) {
            self.arena.remove(index);
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.arena = Arena::new(self.capacity);
        self.map.clear();
    }

    fn len(&self) -> usize {
        self.arena.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn name(&self) -> &'static str {
        "LRU"
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            current_size: self.arena.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_document;

    #[test]
    fn basic_insert_and_get() {
        let mut cache = LruPages::new(3);
        cache.insert("/a".into(), test_document("/a"));
        cache.insert("/b".into(), test_document("/b"));
        cache.insert("/c".into(), test_document("/c"));

        assert!(cache.get("/a").is_some());
        assert!(cache.get("/b").is_some());
        assert!(cache.get("/c").is_some());
    }

    #[test]
    fn evicts_lru_on_overflow() {
        let mut cache = LruPages::new(2);
        cache.insert("/a".into(), test_document("/a"));
        cache.insert("/b".into(), test_document("/b"));

        // Access "/a" to make it recently used
        cache.get("/a");

        // Insert "/c" — should evict "/b" (least recently used)
        cache.insert("/c".into(), test_document("/c"));
        assert!(cache.get("/a").is_some()); // was accessed, kept
        assert!(cache.get("/b").is_none()); // LRU, evicted
        assert!(cache.get("/c").is_some());
    }

    #[test]
    fn promotion_on_hit() {
        let mut cache = LruPages::new(3);
        cache.insert("/a".into(), test_document("/a"));
        cache.insert("/b".into(), test_document("/b"));
        cache.insert("/c".into(), test_document("/c"));

        // Access "/a" — promotes it to MRU
        cache.get("/a");

        // Insert "/d" and "/e" — should evict "/b" then "/c"
        cache.insert("/d".into(), test_document("/d"));
        assert!(cache.get("/b").is_none());

        cache.insert("/e".into(), test_document("/e"));
        assert!(cache.get("/c").is_none());
        assert!(cache.get("/a").is_some()); // survived because promoted
    }

    #[test]
    fn explicit_remove() {
        let mut cache = LruPages::new(3);
        cache.insert("/a".into(), test_document("/a"));
        assert!(cache.remove("/a"));
        assert!(cache.get("/a").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_empties() {
        let mut cache = LruPages::new(3);
        cache.insert("/a".into(), test_document("/a"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("/a").is_none());
    }

    #[test]
    fn stats_tracking() {
        let mut cache = LruPages::new(2);
        cache.insert("/a".into(), test_document("/a"));
        cache.get("/a"); // hit
        cache.get("/z"); // miss
        cache.insert("/b".into(), test_document("/b"));
        cache.insert("/c".into(), test_document("/c")); // at capacity, evicts the LRU entry

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn reinsert_same_key() {
        let mut cache = LruPages::new(2);
        cache.insert("/a".into(), test_document("/a"));
        cache.insert("/b".into(), test_document("/b"));
        cache.insert("/a".into(), test_document("/a")); // update, should not cause eviction

        assert_eq!(cache.len(), 2);
        assert!(cache.get("/a").is_some());
        assert!(cache.get("/b").is_some());
    }
}
