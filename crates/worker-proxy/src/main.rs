mod config;
mod control;
mod lifecycle;
mod proxy;
mod store;
mod strategy;
mod upstream;

use arc_swap::ArcSwap;
use axum::routing::{any, get, post};
use axum::Router;
use config::WorkerConfig;
use control::{message_handler, stats_handler};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use proxy::{worker_handler, WorkerState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use store::MemoryStorage;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use upstream::HyperOrigin;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load config
    let config = if Path::new("config.toml").exists() {
        match WorkerConfig::load(Path::new("config.toml")) {
            Ok(c) => {
                tracing::info!("loaded config from config.toml");
                c
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load config.toml, using defaults");
                WorkerConfig::default_config()
            }
        }
    } else {
        tracing::info!("no config.toml found, using defaults");
        WorkerConfig::default_config()
    };

    // Build HTTP client for upstream requests
    let client = Client::builder(TokioExecutor::new()).build_http();
    let origin = Arc::new(HyperOrigin::new(
        client.clone(),
        config.origin.url.clone(),
        Duration::from_millis(config.origin.timeout_ms),
    ));

    let state = Arc::new(WorkerState {
        config: ArcSwap::from_pointee(config.clone()),
        storage: Arc::new(MemoryStorage::new()),
        origin,
        client,
    });

    // Lifecycle: precache, then sweep stale generations, then serve
    lifecycle::install(&state).await;
    lifecycle::activate(&state);

    // Shutdown token for graceful shutdown
    let shutdown = CancellationToken::new();

    // Build control router (separate port)
    let control_router = Router::new()
        .route("/message", post(message_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(Arc::clone(&state));

    // Build worker router (main port)
    let worker_router = Router::new()
        .route("/{*path}", any(worker_handler))
        .route("/", any(worker_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .with_state(Arc::clone(&state));

    let listen_addr = config.server.listen_addr.clone();
    let control_addr = config.server.control_addr.clone();

    tracing::info!(
        listen = %listen_addr,
        control = %control_addr,
        origin = %config.origin.url,
        cache_version = config.cache.version,
        precache = config.cache.precache.len(),
        "glide worker starting"
    );

    let worker_listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind worker to {listen_addr}: {e}"));

    let control_listener = tokio::net::TcpListener::bind(&control_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind control channel to {control_addr}: {e}"));

    // Spawn config file watcher
    spawn_config_watcher(PathBuf::from("config.toml"), config, Arc::clone(&state));

    // Spawn shutdown signal handler
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal(shutdown_clone).await;
    });

    // Run both servers with graceful shutdown
    let worker_shutdown = shutdown.clone();
    let control_shutdown = shutdown.clone();

    let worker_future = axum::serve(worker_listener, worker_router)
        .with_graceful_shutdown(worker_shutdown.cancelled_owned());

    let control_future = axum::serve(control_listener, control_router)
        .with_graceful_shutdown(control_shutdown.cancelled_owned());

    tokio::select! {
        result = worker_future => {
            if let Err(e) = result {
                tracing::error!(error = %e, "worker server error");
            }
        }
        result = control_future => {
            if let Err(e) = result {
                tracing::error!(error = %e, "control server error");
            }
        }
    }

    tracing::info!("glide worker shut down");
}

/// Listen for SIGINT (Ctrl+C) or SIGTERM and cancel the shutdown token.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    tracing::info!("shutdown signal received, draining connections...");
    token.cancel();
}

/// Spawn a filesystem watcher on config.toml that applies safe config changes at runtime.
fn spawn_config_watcher(config_path: PathBuf, initial_config: WorkerConfig, state: Arc<WorkerState>) {
    let current_config = Arc::new(Mutex::new(initial_config));

    let config_path_clone = config_path.clone();
    let mut watcher = match notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                match WorkerConfig::load(&config_path_clone) {
                    Ok(new_config) => {
                        let mut old = current_config.lock();
                        config::diff_and_apply(&old, &new_config, &state);
                        *old = new_config;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to reload config.toml");
                    }
                }
            }
        }
    }) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!(error = %e, "failed to start config watcher");
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_path, RecursiveMode::NonRecursive) {
        tracing::warn!(error = %e, "failed to watch config.toml");
        return;
    }

    // Leak the watcher so it lives for the process lifetime
    std::mem::forget(watcher);
    tracing::info!("config file watcher started");
}
