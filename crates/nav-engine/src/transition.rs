use crate::host::DocumentHost;
use glide_cache::document::PageDocument;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Emitted after every committed navigation so independent listeners
/// (scroll-animation managers and the like) can re-initialize against the
/// new document.
#[derive(Debug, Clone)]
pub struct PageLoaded {
    pub url: String,
}

/// Commits a fetched document into the live document.
///
/// Prefers the host's grouped visual transition when it has one; otherwise
/// falls back to a manual two-phase fade. Either way, the page-loaded
/// signal and the scroll reset fire unconditionally — they are
/// post-conditions of every successful commit, not of a particular
/// transition mechanism.
pub struct TransitionRenderer {
    host: Arc<dyn DocumentHost>,
    fade: Duration,
    events: broadcast::Sender<PageLoaded>,
}

impl TransitionRenderer {
    pub fn new(host: Arc<dyn DocumentHost>, fade: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { host, fade, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageLoaded> {
        self.events.subscribe()
    }

    pub async fn commit(&self, doc: &PageDocument) {
        if self.host.grouped_transitions() {
            self.host.apply(doc);
        } else {
            // Manual fade: out, swap, in
            self.host.set_opacity(0.0);
            tokio::time::sleep(self.fade).await;
            self.host.apply(doc);
            self.host.set_opacity(1.0);
        }

        self.host.scroll_to_top();
        // No subscribers is fine
        let _ = self.events.send(PageLoaded {
            url: doc.url.clone(),
        });
    }
}
