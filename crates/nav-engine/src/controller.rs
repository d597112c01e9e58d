use crate::cache::PageCache;
use crate::config::NavConfig;
use crate::error::FetchError;
use crate::extract::{self, ExtractRules};
use crate::fetch::PageFetcher;
use crate::history::{History, PoppedEntry};
use crate::host::DocumentHost;
use crate::links::{is_navigable, LinkView};
use crate::transition::{PageLoaded, TransitionRenderer};
use glide_cache::document::{CacheStats, PageDocument};
use glide_cache::flight::FlightTable;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Mutable navigation state, owned by the controller alone.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub current_url: String,
    pub is_navigating: bool,
    pub started_at: Option<Instant>,
}

/// How a `navigate` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Content swapped, history pushed.
    Committed { duration: Duration },
    /// Dropped: a navigation was already in flight, or the URL is current.
    Skipped,
    /// Fetch failed; the host was told to do a full browser navigation.
    FellBack,
}

struct ControllerShared {
    fetcher: Arc<dyn PageFetcher>,
    host: Arc<dyn DocumentHost>,
    history: Arc<dyn History>,
    renderer: TransitionRenderer,
    cache: PageCache,
    flights: FlightTable<Result<Arc<PageDocument>, FetchError>>,
    preload: Mutex<HashSet<String>>,
    state: Mutex<NavigationState>,
    rules: ExtractRules,
    origin_host: String,
}

/// Single owner of the page cache, the in-flight table and the navigation
/// state machine. Everything else — the prefetch scheduler, history pops,
/// host event wiring — goes through the operations here; nothing mutates
/// the shared structures directly.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct NavigationController {
    inner: Arc<ControllerShared>,
}

/// Clears the navigating flag and the loading indicator on every exit path,
/// including panics in the swap.
struct NavigatingGuard<'a> {
    shared: &'a ControllerShared,
}

impl Drop for NavigatingGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.is_navigating = false;
            state.started_at = None;
        }
        self.shared.host.set_loading(false);
    }
}

impl NavigationController {
    pub fn new(
        config: &NavConfig,
        initial_url: &str,
        fetcher: Arc<dyn PageFetcher>,
        history: Arc<dyn History>,
        host: Arc<dyn DocumentHost>,
    ) -> Self {
        let renderer = TransitionRenderer::new(
            Arc::clone(&host),
            Duration::from_millis(config.fade_ms),
        );

        Self {
            inner: Arc::new(ControllerShared {
                fetcher,
                host,
                history,
                renderer,
                cache: PageCache::new(&config.eviction_policy, config.cache_capacity),
                flights: FlightTable::new(),
                preload: Mutex::new(HashSet::new()),
                state: Mutex::new(NavigationState {
                    current_url: initial_url.to_string(),
                    is_navigating: false,
                    started_at: None,
                }),
                rules: ExtractRules {
                    main_selector: config.main_selector.clone(),
                    secondary_selectors: config.secondary_selectors.clone(),
                },
                origin_host: config.origin_host.clone(),
            }),
        }
    }

    /// Fetch a page, or join the request already fetching it.
    ///
    /// Cache hit: returns synchronously, no network. Otherwise at most one
    /// network request per URL is in flight; every concurrent caller shares
    /// its eventual result. On success the parsed document lands in the
    /// page cache before any caller resumes.
    pub async fn fetch_or_join(&self, url: &str) -> Result<Arc<PageDocument>, FetchError> {
        if let Some(doc) = self.inner.cache.get(url) {
            tracing::debug!(url, "page cache hit");
            return Ok(doc);
        }

        let (flight, led) = {
            let fetcher = Arc::clone(&self.inner.fetcher);
            let cache = self.inner.cache.clone();
            let rules = self.inner.rules.clone();
            let owned_url = url.to_string();

            self.inner.flights.join(url, move || async move {
                let page = fetcher.fetch(&owned_url).await?;
                let doc = Arc::new(extract::extract_document(&rules, &owned_url, &page.body));
                cache.insert(owned_url, Arc::clone(&doc));
                Ok(doc)
            })
        };

        if led {
            tracing::debug!(url, "fetching page");
        } else {
            tracing::debug!(url, "joining in-flight request");
        }

        flight.await
    }

    /// Navigate to `url`, swapping content in place.
    ///
    /// A second call while one navigation is in flight is a silent no-op —
    /// dropped, not queued. So is navigating to the current URL. A failed
    /// fetch falls back to a full browser navigation and is never retried.
    pub async fn navigate(&self, url: &str) -> NavigationOutcome {
        {
            let mut state = self.inner.state.lock();
            if state.is_navigating {
                tracing::debug!(url, "navigation in progress, dropping");
                return NavigationOutcome::Skipped;
            }
            if state.current_url == url {
                tracing::debug!(url, "already current, dropping");
                return NavigationOutcome::Skipped;
            }
            state.is_navigating = true;
            state.started_at = Some(Instant::now());
        }

        let _guard = NavigatingGuard {
            shared: self.inner.as_ref(),
        };
        self.inner.host.set_loading(true);
        let started = Instant::now();

        match self.fetch_or_join(url).await {
            Ok(doc) => {
                self.inner.renderer.commit(&doc).await;
                self.inner.history.push(url);
                self.inner.state.lock().current_url = url.to_string();

                let duration = started.elapsed();
                tracing::info!(url, duration_ms = duration.as_millis() as u64, "navigated");
                NavigationOutcome::Committed { duration }
            }
            Err(error) => {
                tracing::warn!(url, error = %error, "navigation failed, falling back to full load");
                self.inner.host.hard_navigate(url);
                NavigationOutcome::FellBack
            }
        }
    }

    /// Warm the cache for `url` without navigating.
    ///
    /// Skips silently when the page is cached, being fetched, or already
    /// recorded as preloaded. Failures are logged and forgotten — the URL
    /// leaves the preload set so a later hover can retry.
    pub async fn prefetch(&self, url: &str) {
        if self.inner.cache.contains(url) || self.inner.flights.contains(url) {
            return;
        }
        if !self.inner.preload.lock().insert(url.to_string()) {
            return;
        }

        match self.fetch_or_join(url).await {
            Ok(_) => tracing::debug!(url, "prefetched"),
            Err(error) => {
                tracing::warn!(url, error = %error, "prefetch failed");
                self.inner.preload.lock().remove(url);
            }
        }
    }

    /// React to a history pop.
    ///
    /// Entries pushed by the engine carry their URL and re-enter `navigate`;
    /// a stateless entry predates the engine and cannot be rebuilt from
    /// memory, so the host reloads outright.
    pub async fn handle_pop(&self, entry: PoppedEntry) -> NavigationOutcome {
        match entry.url {
            Some(url) => self.navigate(&url).await,
            None => {
                let current = self.current_url();
                tracing::debug!("stateless history entry, hard reload");
                self.inner.host.hard_navigate(&current);
                NavigationOutcome::FellBack
            }
        }
    }

    /// External clear command: drop every cached page and the preload set.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        self.inner.preload.lock().clear();
        tracing::info!("navigation caches cleared");
    }

    /// The shared interception predicate; identical for navigation clicks
    /// and prefetch hints.
    pub fn should_intercept(&self, link: &LinkView) -> bool {
        is_navigable(link, &self.inner.origin_host)
    }

    pub fn state(&self) -> NavigationState {
        self.inner.state.lock().clone()
    }

    pub fn is_navigating(&self) -> bool {
        self.inner.state.lock().is_navigating
    }

    pub fn current_url(&self) -> String {
        self.inner.state.lock().current_url.clone()
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.inner.cache.contains(url)
    }

    pub fn preload_count(&self) -> usize {
        self.inner.preload.lock().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn cache_policy(&self) -> &'static str {
        self.inner.cache.name()
    }

    /// Subscribe to post-navigation page-loaded signals.
    pub fn page_loaded(&self) -> broadcast::Receiver<PageLoaded> {
        self.inner.renderer.subscribe()
    }
}
