use crate::arena::{Arena, Node};
use crate::document::{CacheStats, PageDocument, PagePolicy};
use std::collections::HashMap;
use std::sync::Arc;

/// FIFO (insertion-order) page eviction.
///
/// New pages go to the head; evictions always take the tail, so the
/// oldest-inserted page is dropped first. Hits do not promote — revisiting a
/// page never extends its lifetime. This is the default policy.
pub struct FifoPages {
    arena: Arena,
    map: HashMap<String, u32, ahash::RandomState>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl FifoPages {
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

impl PagePolicy for FifoPages {
    fn get(&mut self, key: &str) -> Option<Arc<PageDocument>> {
        if let Some(&index) = self.map.get(key) {
            self.hits += 1;
            // No promotion on hit, just return the value
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

        // Evict from tail (oldest inserted) if at capacity
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
        "FIFO"
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
