use crate::proxy::WorkerState;
use std::sync::Arc;

/// Install phase: pre-populate the static cache from the configured
/// precache list.
///
/// Per-URL failures are logged and skipped — a missing font must not block
/// the worker from coming up. There is no waiting phase: once install
/// returns, activation proceeds immediately.
pub async fn install(state: &Arc<WorkerState>) {
    let config = state.config.load_full();
    let names = config.cache.names();
    let bucket = state.storage.open(&names.static_cache);

    let mut stored = 0usize;
    for url in &config.cache.precache {
        match state.origin.get(url).await {
            Ok(response) if (200..300).contains(&response.status) => {
                bucket.put(url.clone(), response);
                stored += 1;
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = response.status, "precache skipped");
            }
            Err(error) => {
                tracing::warn!(url = %url, error = %error, "precache fetch failed");
            }
        }
    }

    tracing::info!(
        requested = config.cache.precache.len(),
        stored,
        cache = %names.static_cache,
        "install complete"
    );
}

/// Activation: sweep every cache whose name fell out of the valid set.
///
/// Runs at startup right after install, and again whenever a config reload
/// bumps the cache version. Serving continues (or starts) immediately
/// afterwards — no client has to reconnect to see the new generation.
pub fn activate(state: &Arc<WorkerState>) {
    let config = state.config.load_full();
    let valid = config.cache.names().valid();

    let mut swept = 0usize;
    for name in state.storage.names() {
        if !valid.contains(&name) {
            state.storage.delete(&name);
            tracing::info!(cache = %name, "swept stale cache");
            swept += 1;
        }
    }

    tracing::info!(swept, version = config.cache.version, "activation complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::store::{CacheStorage, MemoryStorage, StoredResponse};
    use crate::upstream::{HttpClient, OriginClient, UpstreamError};
    use arc_swap::ArcSwap;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use hyper_util::client::legacy::Client;
    use hyper_util::rt::TokioExecutor;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    struct ScriptedOrigin {
        responses: Mutex<HashMap<String, StoredResponse>>,
        failing: HashSet<String>,
    }

    impl ScriptedOrigin {
        fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                failing: HashSet::new(),
            }
        }
    }

    impl OriginClient for ScriptedOrigin {
        fn get(&self, target: &str) -> BoxFuture<'static, Result<StoredResponse, UpstreamError>> {
            let result = if self.failing.contains(target) {
                Err(UpstreamError::new("connection refused"))
            } else {
                Ok(self
                    .responses
                    .lock()
                    .get(target)
                    .cloned()
                    .unwrap_or(StoredResponse::ok("asset")))
            };
            async move { result }.boxed()
        }
    }

    fn client() -> HttpClient {
        Client::builder(TokioExecutor::new()).build_http()
    }

    fn state_with(config: WorkerConfig, origin: ScriptedOrigin) -> Arc<WorkerState> {
        Arc::new(WorkerState {
            config: ArcSwap::from_pointee(config),
            storage: Arc::new(MemoryStorage::new()),
            origin: Arc::new(origin),
            client: client(),
        })
    }

    #[tokio::test]
    async fn install_populates_static_cache_and_tolerates_failures() {
        let mut config = WorkerConfig::default_config();
        config.cache.precache = vec![
            "/assets/theme.css".to_string(),
            "/assets/missing.js".to_string(),
        ];

        let mut origin = ScriptedOrigin::new();
        origin
            .responses
            .lock()
            .insert("/assets/theme.css".into(), StoredResponse::ok("body{}"));
        origin.failing.insert("/assets/missing.js".to_string());

        let state = state_with(config, origin);
        install(&state).await;

        let bucket = state.storage.open("glide-static-v1");
        assert!(bucket.lookup("/assets/theme.css").is_some());
        assert!(bucket.lookup("/assets/missing.js").is_none());
    }

    #[tokio::test]
    async fn activation_sweeps_invalid_names_only() {
        let state = state_with(WorkerConfig::default_config(), ScriptedOrigin::new());

        // Current generation plus leftovers from a previous version
        for name in [
            "glide-static-v1",
            "glide-pages-v1",
            "glide-api-v1",
            "glide-static-v0",
            "glide-pages-v0",
        ] {
            state.storage.open(name).put("/x".into(), StoredResponse::ok("x"));
        }

        activate(&state);

        assert_eq!(
            state.storage.names(),
            vec!["glide-api-v1", "glide-pages-v1", "glide-static-v1"]
        );
    }

    #[tokio::test]
    async fn version_bump_invalidates_previous_generation() {
        let state = state_with(WorkerConfig::default_config(), ScriptedOrigin::new());
        state
            .storage
            .open("glide-pages-v1")
            .put("/".into(), StoredResponse::ok("old"));

        let mut bumped = WorkerConfig::default_config();
        bumped.cache.version = 2;
        state.config.store(Arc::new(bumped));

        activate(&state);

        assert!(state.storage.names().is_empty());
    }
}
