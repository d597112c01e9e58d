use glide_cache::document::PageDocument;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The live document, as far as the engine is concerned.
///
/// A real host applies fragments to the DOM; the engine only ever calls
/// through this trait, so the core stays runnable without a browser.
pub trait DocumentHost: Send + Sync {
    /// Replace title, main content and secondary regions.
    fn apply(&self, doc: &PageDocument);

    /// Content opacity, used by the manual two-phase fade.
    fn set_opacity(&self, opacity: f32);

    fn scroll_to_top(&self);

    /// Toggle the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Whether the runtime exposes a grouped visual-transition primitive.
    fn grouped_transitions(&self) -> bool {
        false
    }

    /// Full browser navigation — the fatal fallback when instant navigation
    /// cannot complete.
    fn hard_navigate(&self, url: &str);
}

/// Recording host for tests and the session driver.
pub struct SimHost {
    grouped: bool,
    applied: Mutex<Vec<String>>,
    opacity_trace: Mutex<Vec<f32>>,
    scrolls: AtomicUsize,
    loading: AtomicBool,
    hard_navigations: Mutex<Vec<String>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::with_grouped_transitions(false)
    }

    pub fn with_grouped_transitions(grouped: bool) -> Self {
        Self {
            grouped,
            applied: Mutex::new(Vec::new()),
            opacity_trace: Mutex::new(Vec::new()),
            scrolls: AtomicUsize::new(0),
            loading: AtomicBool::new(false),
            hard_navigations: Mutex::new(Vec::new()),
        }
    }

    /// URLs of documents applied so far, in order.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().clone()
    }

    pub fn opacity_trace(&self) -> Vec<f32> {
        self.opacity_trace.lock().clone()
    }

    pub fn scroll_resets(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn hard_navigations(&self) -> Vec<String> {
        self.hard_navigations.lock().clone()
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentHost for SimHost {
    fn apply(&self, doc: &PageDocument) {
        self.applied.lock().push(doc.url.clone());
    }

    fn set_opacity(&self, opacity: f32) {
        self.opacity_trace.lock().push(opacity);
    }

    fn scroll_to_top(&self) {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
    }

    fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    fn grouped_transitions(&self) -> bool {
        self.grouped
    }

    fn hard_navigate(&self, url: &str) {
        self.hard_navigations.lock().push(url.to_string());
    }
}
