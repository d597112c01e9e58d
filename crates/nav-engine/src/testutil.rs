use crate::error::FetchError;
use crate::fetch::{FetchedPage, PageFetcher};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use glide_cache::document::PageDocument;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub(crate) fn doc(url: &str) -> Arc<PageDocument> {
    Arc::new(PageDocument {
        url: url.to_string(),
        title: format!("Page {url}"),
        head: String::new(),
        main: format!("<p>{url}</p>"),
        secondary: Vec::new(),
        fetched_at: Instant::now(),
    })
}

/// Storefront-shaped page body for a URL.
pub(crate) fn page_html(url: &str) -> String {
    format!(
        r##"<html>
  <head><title>Page {url}</title></head>
  <body>
    <nav class="breadcrumbs"><a href="/">Home</a></nav>
    <div id="MainContent"><h1>{url}</h1></div>
  </body>
</html>"##
    )
}

/// Counting fetcher with an optional artificial delay or permanent failure.
pub(crate) struct MockFetcher {
    calls: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: None,
            fail: false,
        }
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<FetchedPage, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = url.to_string();
        let delay = self.delay;
        let fail = self.fail;

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fail {
                return Err(FetchError::Status { status: 500 });
            }
            Ok(FetchedPage {
                status: 200,
                body: page_html(&url),
                url,
            })
        }
        .boxed()
    }
}

/// Give spawned tasks a chance to run to completion on the current-thread
/// test runtime.
pub(crate) async fn drain() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
