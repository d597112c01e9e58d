use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// The shared handle every concurrent requester for one key polls.
pub type SharedFlight<T> = Shared<BoxFuture<'static, T>>;

/// Keyed table of in-flight requests.
///
/// The first caller for a key (the leader) supplies the underlying future;
/// everyone who asks for the same key while it is pending gets a clone of the
/// same shared future and observes the identical output. The entry removes
/// itself when the future settles — success or failure, regardless of how
/// many waiters joined — so a later request for the same key starts fresh.
///
/// Invariant: at most one underlying future per key at any time.
pub struct FlightTable<T: Clone> {
    inner: Arc<Mutex<HashMap<String, SharedFlight<T>, ahash::RandomState>>>,
}

impl<T: Clone + Send + Sync + 'static> FlightTable<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::default())),
        }
    }

    /// Join the in-flight request for `key`, or lead a new one.
    ///
    /// `make` is only invoked when no request is pending for `key`. Returns
    /// the shared future plus whether this caller became the leader. The
    /// future makes progress only while polled; the table never spawns.
    pub fn join<F, Fut>(&self, key: &str, make: F) -> (SharedFlight<T>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut map = self.inner.lock();
        if let Some(existing) = map.get(key) {
            return (existing.clone(), false);
        }

        let table = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        let fut = make();
        let shared = async move {
            let output = fut.await;
            table.lock().remove(&owned_key);
            output
        }
        .boxed()
        .shared();

        map.insert(key.to_string(), shared.clone());
        (shared, true)
    }

    /// Whether a request for `key` is currently pending.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for FlightTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_joiners_share_one_execution() {
        let table: FlightTable<u64> = FlightTable::new();
        let executions = Arc::new(AtomicUsize::new(0));

        // Three callers arrive before the first resolves
        let make = |n: u64| {
            let executions = Arc::clone(&executions);
            move || async move {
                executions.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                n
            }
        };

        let (f1, led1) = table.join("/products/widget", make(1));
        let (f2, led2) = table.join("/products/widget", make(2));
        let (f3, led3) = table.join("/products/widget", make(3));

        assert!(led1);
        assert!(!led2);
        assert!(!led3);

        let (a, b, c) = tokio::join!(f1, f2, f3);
        // All observers get the leader's value, exactly one execution
        assert_eq!((a, b, c), (1, 1, 1));
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn entry_removed_once_settled() {
        let table: FlightTable<&'static str> = FlightTable::new();

        let (fut, led) = table.join("/", || async { "done" });
        assert!(led);
        assert!(table.contains("/"));

        assert_eq!(fut.await, "done");
        assert!(!table.contains("/"));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn next_request_after_settle_leads_again() {
        let table: FlightTable<u32> = FlightTable::new();

        let (first, _) = table.join("/page", || async { 1 });
        assert_eq!(first.await, 1);

        let (second, led) = table.join("/page", || async { 2 });
        assert!(led, "settled entry must not linger in the table");
        assert_eq!(second.await, 2);
    }

    #[tokio::test]
    async fn failure_is_shared_and_cleared() {
        let table: FlightTable<Result<u32, String>> = FlightTable::new();

        let (f1, _) = table.join("/broken", || async {
            tokio::time::sleep(Duration::from_millis(2)).await;
            Err::<u32, _>("HTTP 500".to_string())
        });
        let (f2, led2) = table.join("/broken", || async { Ok(42) });
        assert!(!led2);

        let (a, b) = tokio::join!(f1, f2);
        assert_eq!(a, Err("HTTP 500".to_string()));
        assert_eq!(b, Err("HTTP 500".to_string()));

        // Failure settles the flight too
        assert!(!table.contains("/broken"));
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let table: FlightTable<u32> = FlightTable::new();

        let (fa, led_a) = table.join("/a", || async { 1 });
        let (fb, led_b) = table.join("/b", || async { 2 });

        assert!(led_a);
        assert!(led_b);
        assert_eq!(table.len(), 2);

        let (a, b) = tokio::join!(fa, fb);
        assert_eq!((a, b), (1, 2));
    }
}
