use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A cached HTTP response.
///
/// No TTL: entries persist until an explicit clear command or until their
/// whole cache is swept after a version bump.
#[derive(Clone, Debug)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: Instant,
}

#[cfg(test)]
impl StoredResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
            stored_at: Instant::now(),
        }
    }
}

/// Snapshot of one named cache.
#[derive(Clone, Debug, Default)]
pub struct BucketStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// One named cache.
pub trait CacheBucket: Send + Sync {
    fn lookup(&self, key: &str) -> Option<Arc<StoredResponse>>;
    fn put(&self, key: String, response: StoredResponse);
    fn len(&self) -> usize;
    fn stats(&self) -> BucketStats;
}

/// The collection of named caches the worker owns.
///
/// Abstracted so the strategy logic runs against plain memory in tests; a
/// real deployment can back this with whatever persistent store it has.
pub trait CacheStorage: Send + Sync {
    /// Open a cache by name, creating it if absent.
    fn open(&self, name: &str) -> Arc<dyn CacheBucket>;
    fn names(&self) -> Vec<String>;
    fn delete(&self, name: &str) -> bool;
}

#[derive(Default)]
pub struct MemoryBucket {
    entries: RwLock<HashMap<String, Arc<StoredResponse>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheBucket for MemoryBucket {
    fn lookup(&self, key: &str) -> Option<Arc<StoredResponse>> {
        let found = self.entries.read().get(key).cloned();
        match &found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn put(&self, key: String, response: StoredResponse) {
        self.entries.write().insert(key, Arc::new(response));
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn stats(&self) -> BucketStats {
        BucketStats {
            entries: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    buckets: RwLock<HashMap<String, Arc<MemoryBucket>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn open(&self, name: &str) -> Arc<dyn CacheBucket> {
        if let Some(bucket) = self.buckets.read().get(name) {
            return Arc::clone(bucket) as Arc<dyn CacheBucket>;
        }
        let mut buckets = self.buckets.write();
        let bucket = buckets
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryBucket::default()));
        Arc::clone(bucket) as Arc<dyn CacheBucket>
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn delete(&self, name: &str) -> bool {
        self.buckets.write().remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_and_reuses() {
        let storage = MemoryStorage::new();
        let a = storage.open("glide-static-v1");
        a.put("/assets/app.css".into(), StoredResponse::ok("body{}"));

        // Same name resolves to the same bucket
        let again = storage.open("glide-static-v1");
        assert!(again.lookup("/assets/app.css").is_some());
        assert_eq!(storage.names(), vec!["glide-static-v1"]);
    }

    #[test]
    fn delete_drops_contents() {
        let storage = MemoryStorage::new();
        storage
            .open("glide-pages-v1")
            .put("/".into(), StoredResponse::ok("<html>"));

        assert!(storage.delete("glide-pages-v1"));
        assert!(!storage.delete("glide-pages-v1"));

        // Reopening yields a fresh, empty bucket
        assert_eq!(storage.open("glide-pages-v1").len(), 0);
    }

    #[test]
    fn lookup_counts_hits_and_misses() {
        let bucket = MemoryBucket::default();
        bucket.put("/a".into(), StoredResponse::ok("x"));

        bucket.lookup("/a");
        bucket.lookup("/a");
        bucket.lookup("/zzz");

        let stats = bucket.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn put_overwrites() {
        let bucket = MemoryBucket::default();
        bucket.put("/a".into(), StoredResponse::ok("v1"));
        bucket.put("/a".into(), StoredResponse::ok("v2"));

        assert_eq!(bucket.len(), 1);
        assert_eq!(&bucket.lookup("/a").unwrap().body[..], b"v2");
    }
}
