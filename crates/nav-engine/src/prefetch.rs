use crate::config::NavConfig;
use crate::controller::NavigationController;
use crate::links::LinkView;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Speculative cache warming driven by pointer, touch and idle signals.
///
/// The scheduler never touches the cache or the in-flight table itself —
/// every fetch goes through the controller's `prefetch`, which already
/// refuses duplicates. What lives here is purely the timing policy: the
/// hover debounce, the sweep throttle, and the idle-scan budget.
pub struct PrefetchScheduler {
    controller: NavigationController,
    hover_delay: Duration,
    min_interval: Duration,
    idle_limit: usize,
    hover_task: Mutex<Option<JoinHandle<()>>>,
    last_hover_fetch: Arc<Mutex<Option<Instant>>>,
}

impl PrefetchScheduler {
    pub fn new(controller: NavigationController, config: &NavConfig) -> Self {
        Self {
            controller,
            hover_delay: Duration::from_millis(config.hover_delay_ms),
            min_interval: Duration::from_millis(config.prefetch_interval_ms),
            idle_limit: config.idle_prefetch_limit,
            hover_task: Mutex::new(None),
            last_hover_fetch: Arc::new(Mutex::new(None)),
        }
    }

    /// Pointer settled on a link: arm the debounce timer.
    ///
    /// If the pointer leaves before the timer fires, nothing happens. A
    /// minimum interval between hover-triggered fetches keeps a pointer
    /// sweep across a row of links from bursting the network.
    pub fn pointer_enter(&self, link: &LinkView) {
        if !self.controller.should_intercept(link) {
            return;
        }
        if self.controller.is_navigating() {
            return;
        }
        if let Some(at) = *self.last_hover_fetch.lock() {
            if at.elapsed() < self.min_interval {
                return;
            }
        }

        self.cancel_hover();

        let controller = self.controller.clone();
        let last_hover_fetch = Arc::clone(&self.last_hover_fetch);
        let url = link.href.clone();
        let delay = self.hover_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            *last_hover_fetch.lock() = Some(Instant::now());
            controller.prefetch(&url).await;
        });
        *self.hover_task.lock() = Some(handle);
    }

    /// Pointer left before committing: cancel the pending timer silently.
    pub fn pointer_leave(&self) {
        self.cancel_hover();
    }

    /// Touch has no hover phase — prefetch immediately.
    pub async fn touch_start(&self, link: &LinkView) {
        if !self.controller.should_intercept(link) {
            return;
        }
        self.controller.prefetch(&link.href).await;
    }

    /// Idle-time warmup: prefetch the first few visible qualifying links.
    pub async fn idle_scan(&self, visible_links: &[LinkView]) {
        let mut prefetched = 0;
        for link in visible_links {
            if prefetched >= self.idle_limit {
                break;
            }
            if !self.controller.should_intercept(link) {
                continue;
            }
            self.controller.prefetch(&link.href).await;
            prefetched += 1;
        }
        tracing::debug!(count = prefetched, "idle prefetch scan done");
    }

    fn cancel_hover(&self) {
        if let Some(handle) = self.hover_task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for PrefetchScheduler {
    fn drop(&mut self) {
        self.cancel_hover();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SimHistory;
    use crate::host::SimHost;
    use crate::testutil::{drain, MockFetcher};

    fn scheduler(
        fetcher: Arc<MockFetcher>,
        config: &NavConfig,
    ) -> (PrefetchScheduler, NavigationController) {
        let controller = NavigationController::new(
            config,
            "/",
            fetcher,
            Arc::new(SimHistory::new()),
            Arc::new(SimHost::with_grouped_transitions(true)),
        );
        (
            PrefetchScheduler::new(controller.clone(), config),
            controller,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn hover_fires_after_debounce() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, controller) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.pointer_enter(&LinkView::new("/products/widget"));
        drain().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        drain().await;

        assert_eq!(fetcher.calls(), 1);
        assert!(controller.is_cached("/products/widget"));
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_before_threshold_cancels() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, _) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.pointer_enter(&LinkView::new("/products/widget"));
        // 65ms of hover, then away — under the 80ms threshold
        tokio::time::advance(Duration::from_millis(65)).await;
        scheduler.pointer_leave();

        tokio::time::advance(Duration::from_millis(500)).await;
        drain().await;

        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_throttle_limits_bursts() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, _) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.pointer_enter(&LinkView::new("/products/one"));
        drain().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        drain().await;

        // Second hover lands inside the min-interval window
        scheduler.pointer_enter(&LinkView::new("/products/two"));
        tokio::time::advance(Duration::from_millis(100)).await;
        drain().await;
        assert_eq!(fetcher.calls(), 1);

        // After the window passes, hovering works again
        tokio::time::advance(Duration::from_millis(300)).await;
        scheduler.pointer_enter(&LinkView::new("/products/two"));
        drain().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        drain().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn new_hover_replaces_pending_timer() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, controller) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.pointer_enter(&LinkView::new("/products/one"));
        drain().await;
        tokio::time::advance(Duration::from_millis(40)).await;
        scheduler.pointer_enter(&LinkView::new("/products/two"));
        drain().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        drain().await;

        assert_eq!(fetcher.calls(), 1);
        assert!(controller.is_cached("/products/two"));
        assert!(!controller.is_cached("/products/one"));
    }

    #[tokio::test]
    async fn touch_prefetches_immediately() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, controller) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.touch_start(&LinkView::new("/collections/sale")).await;

        assert_eq!(fetcher.calls(), 1);
        assert!(controller.is_cached("/collections/sale"));
    }

    #[tokio::test]
    async fn touch_ignores_non_navigable_links() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, _) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        scheduler.touch_start(&LinkView::new("/cart")).await;
        scheduler
            .touch_start(&LinkView::new("https://elsewhere.test/x"))
            .await;

        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn idle_scan_respects_limit_and_predicate() {
        let fetcher = Arc::new(MockFetcher::new());
        let (scheduler, _) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        let links = vec![
            LinkView::new("/checkout"), // excluded, does not consume budget
            LinkView::new("/products/a"),
            LinkView::new("/products/b"),
            LinkView::new("/products/c"),
            LinkView::new("/products/d"), // over budget
        ];
        scheduler.idle_scan(&links).await;

        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hover_skipped_while_navigating() {
        let fetcher = Arc::new(MockFetcher::with_delay(Duration::from_millis(50)));
        let (scheduler, controller) = scheduler(Arc::clone(&fetcher), &NavConfig::default());

        let nav = controller.navigate("/collections/sale");
        tokio::pin!(nav);
        // Drive the navigation to its first await so the flag is set
        futures_util::future::poll_immediate(nav.as_mut()).await;
        assert!(controller.is_navigating());

        scheduler.pointer_enter(&LinkView::new("/products/widget"));
        assert!(scheduler.hover_task.lock().is_none());

        nav.await;
        assert_eq!(fetcher.calls(), 1);
    }
}
