use std::sync::Arc;
use std::time::{Duration, Instant};

/// A fetched and parsed page, ready to be swapped into the live document.
///
/// Fragments are raw HTML text. A region that was absent in the response is
/// stored as an empty string rather than being treated as an error.
#[derive(Clone, Debug)]
pub struct PageDocument {
    pub url: String,
    pub title: String,
    pub head: String,
    pub main: String,
    pub secondary: Vec<Region>,
    pub fetched_at: Instant,
}

/// A secondary page region (e.g. breadcrumbs), extracted by selector.
#[derive(Clone, Debug)]
pub struct Region {
    pub selector: String,
    pub html: String,
}

impl PageDocument {
    /// Look up a secondary region by the selector it was extracted with.
    pub fn region(&self, selector: &str) -> Option<&str> {
        self.secondary
            .iter()
            .find(|r| r.selector == selector)
            .map(|r| r.html.as_str())
    }

    /// Time elapsed since this document was fetched.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Snapshot of cache statistics.
#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_size: usize,
    pub capacity: usize,
}

/// Common interface for the page-cache eviction policies.
///
/// Implementations: FIFO (insertion order), LRU.
/// All methods take `&mut self` — callers wrap the policy in their own lock.
pub trait PagePolicy: Send {
    /// Look up a URL. Returns the cached document if present.
    fn get(&mut self, key: &str) -> Option<Arc<PageDocument>>;

    /// Check for a URL without touching recency or hit/miss counters.
    fn contains(&self, key: &str) -> bool;

    /// Insert a document. May trigger eviction if at capacity.
    fn insert(&mut self, key: String, value: Arc<PageDocument>);

    /// Remove a URL explicitly.
    fn remove(&mut self, key: &str) -> bool;

    /// Drop every entry, keeping the configured capacity.
    fn clear(&mut self);

    /// Number of entries currently in the cache.
    fn len(&self) -> usize;

    /// Whether the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Human-readable name of the eviction policy.
    fn name(&self) -> &'static str;

    /// Current statistics snapshot.
    fn stats(&self) -> CacheStats;
}

#[cfg(test)]
pub(crate) fn test_document(url: &str) -> Arc<PageDocument> {
    Arc::new(PageDocument {
        url: url.to_string(),
        title: format!("Page {url}"),
        head: String::new(),
        main: format!("<p>{url}</p>"),
        secondary: Vec::new(),
        fetched_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_lookup() {
        let mut doc = (*test_document("/products/widget")).clone();
        doc.secondary.push(Region {
            selector: ".breadcrumbs".into(),
            html: "<ol>...</ol>".into(),
        });

        assert_eq!(doc.region(".breadcrumbs"), Some("<ol>...</ol>"));
        assert_eq!(doc.region(".sidebar"), None);
    }

    #[test]
    fn age_grows() {
        let doc = PageDocument {
            fetched_at: Instant::now() - Duration::from_secs(30),
            ..(*test_document("/")).clone()
        };
        assert!(doc.age() >= Duration::from_secs(30));
    }
}
