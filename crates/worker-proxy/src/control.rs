use crate::proxy::WorkerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Directives accepted on the control channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// Drop every named cache.
    ClearCache,
    /// Fetch the given URLs into the page cache ahead of need.
    PreloadPages { urls: Vec<String> },
}

/// Outcome reported back to the sender.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    Cleared { caches: usize },
    Preloaded { stored: usize, requested: usize },
}

/// Apply a control message against the worker state.
pub async fn apply_message(state: &Arc<WorkerState>, message: WorkerMessage) -> ControlOutcome {
    match message {
        WorkerMessage::ClearCache => {
            let names = state.storage.names();
            for name in &names {
                state.storage.delete(name);
            }
            tracing::info!(caches = names.len(), "all caches cleared");
            ControlOutcome::Cleared {
                caches: names.len(),
            }
        }

        WorkerMessage::PreloadPages { urls } => {
            let config = state.config.load_full();
            let bucket = state.storage.open(&config.cache.names().pages);

            let requested = urls.len();
            let mut stored = 0usize;
            for url in urls {
                match state.origin.get(&url).await {
                    Ok(response) if (200..300).contains(&response.status) => {
                        bucket.put(url, response);
                        stored += 1;
                    }
                    Ok(response) => {
                        tracing::warn!(url = %url, status = response.status, "preload skipped");
                    }
                    Err(error) => {
                        tracing::warn!(url = %url, error = %error, "preload fetch failed");
                    }
                }
            }

            tracing::info!(stored, requested, "preload complete");
            ControlOutcome::Preloaded { stored, requested }
        }
    }
}

/// POST /message — the worker's control channel.
pub async fn message_handler(
    State(state): State<Arc<WorkerState>>,
    Json(message): Json<WorkerMessage>,
) -> impl IntoResponse {
    match apply_message(&state, message).await {
        ControlOutcome::Cleared { caches } => Json(json!({ "cleared": caches })),
        ControlOutcome::Preloaded { stored, requested } => {
            Json(json!({ "preloaded": stored, "requested": requested }))
        }
    }
}

/// GET /api/stats — one-shot snapshot of every named cache.
pub async fn stats_handler(State(state): State<Arc<WorkerState>>) -> impl IntoResponse {
    let caches: Vec<serde_json::Value> = state
        .storage
        .names()
        .into_iter()
        .map(|name| {
            let stats = state.storage.open(&name).stats();
            json!({
                "name": name,
                "entries": stats.entries,
                "hits": stats.hits,
                "misses": stats.misses,
            })
        })
        .collect();

    let config = state.config.load_full();
    Json(json!({
        "version": config.cache.version,
        "caches": caches,
    }))
}
