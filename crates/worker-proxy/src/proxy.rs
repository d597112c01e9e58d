use crate::config::WorkerConfig;
use crate::store::{CacheBucket, CacheStorage, StoredResponse};
use crate::strategy::{RequestShape, Strategy};
use crate::upstream::{HttpClient, OriginClient, UpstreamError};
use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to all handlers.
pub struct WorkerState {
    pub config: ArcSwap<WorkerConfig>,
    pub storage: Arc<dyn CacheStorage>,
    pub origin: Arc<dyn OriginClient>,
    pub client: HttpClient,
}

/// Main worker handler: classify the request, run its caching strategy, or
/// pass it through untouched.
pub async fn worker_handler(
    State(state): State<Arc<WorkerState>>,
    req: Request<Body>,
) -> Response<Body> {
    let started = Instant::now();
    let config = state.config.load_full();
    let uri = req.uri().clone();
    let method = req.method().clone();
    let host = uri.host().map(str::to_string);

    // Absolute-form URLs for hosts we don't know are never intercepted —
    // forward them as-is and let the client deal with the result.
    if let Some(h) = host.as_deref() {
        if !config.routes.cdn_hosts.iter().any(|c| c == h) {
            return passthrough(&state, req).await;
        }
    }

    let shape = RequestShape {
        method: method.clone(),
        path: uri.path().to_string(),
        host: host.clone(),
        accept: req
            .headers()
            .get("accept")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let strategy = config.routes.classify(&shape);

    // The named caches hold GET responses only
    if strategy == Strategy::NetworkOnly || method != Method::GET {
        return passthrough(&state, req).await;
    }

    let key = if host.is_some() {
        uri.to_string()
    } else {
        uri.path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    };

    let names = config.cache.names();
    let bucket_name = match strategy {
        Strategy::CacheFirst => names.static_cache,
        Strategy::NetworkFirst => names.api,
        Strategy::StaleWhileRevalidate => names.pages,
        Strategy::NetworkOnly => unreachable!(),
    };
    let bucket = state.storage.open(&bucket_name);

    match run_cached_strategy(strategy, &bucket, &state.origin, &key).await {
        Ok((stored, cache_status)) => {
            tracing::debug!(
                key = %key,
                strategy = strategy.name(),
                cache = cache_status,
                latency_us = started.elapsed().as_micros() as u64,
                "served"
            );
            respond(&stored, strategy, cache_status)
        }
        Err(error) => {
            tracing::error!(key = %key, strategy = strategy.name(), error = %error, "nothing to serve");
            gateway_error()
        }
    }
}

/// Run one of the three caching strategies for a GET request.
///
/// Returns the response to serve plus a cache-status label. The only error
/// case is "the network failed and the cache had nothing".
pub(crate) async fn run_cached_strategy(
    strategy: Strategy,
    bucket: &Arc<dyn CacheBucket>,
    origin: &Arc<dyn OriginClient>,
    key: &str,
) -> Result<(Arc<StoredResponse>, &'static str), UpstreamError> {
    match strategy {
        Strategy::CacheFirst => {
            if let Some(hit) = bucket.lookup(key) {
                return Ok((hit, "HIT"));
            }
            let fresh = origin.get(key).await?;
            if cacheable(fresh.status) {
                bucket.put(key.to_string(), fresh.clone());
            }
            Ok((Arc::new(fresh), "MISS"))
        }

        Strategy::NetworkFirst => match origin.get(key).await {
            Ok(fresh) => {
                if cacheable(fresh.status) {
                    bucket.put(key.to_string(), fresh.clone());
                }
                Ok((Arc::new(fresh), "MISS"))
            }
            Err(error) => match bucket.lookup(key) {
                Some(stale) => {
                    tracing::warn!(key, error = %error, "network failed, serving last cached copy");
                    Ok((stale, "FALLBACK"))
                }
                None => Err(error),
            },
        },

        Strategy::StaleWhileRevalidate => {
            if let Some(cached) = bucket.lookup(key) {
                // Refresh for next time; the current request never waits on it
                let origin = Arc::clone(origin);
                let bucket = Arc::clone(bucket);
                let key = key.to_string();
                tokio::spawn(async move {
                    match origin.get(&key).await {
                        Ok(fresh) if cacheable(fresh.status) => bucket.put(key, fresh),
                        Ok(fresh) => {
                            tracing::debug!(key = %key, status = fresh.status, "revalidation not stored")
                        }
                        Err(error) => {
                            tracing::warn!(key = %key, error = %error, "background revalidation failed")
                        }
                    }
                });
                return Ok((cached, "HIT"));
            }

            // Nothing cached yet: this request pays for the network leg
            let fresh = origin.get(key).await?;
            if cacheable(fresh.status) {
                bucket.put(key.to_string(), fresh.clone());
            }
            Ok((Arc::new(fresh), "MISS"))
        }

        Strategy::NetworkOnly => unreachable!("network-only requests bypass the caches"),
    }
}

fn cacheable(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Forward a request untouched (network-only, non-GET, unknown hosts).
async fn passthrough(state: &Arc<WorkerState>, req: Request<Body>) -> Response<Body> {
    let config = state.config.load_full();
    let uri = req.uri().clone();
    let method = req.method().clone();

    let target = if uri.host().is_some() {
        uri.to_string()
    } else {
        format!(
            "{}{}",
            config.origin.url.trim_end_matches('/'),
            uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
        )
    };

    let upstream_req = match Request::builder()
        .method(&method)
        .uri(&target)
        .body(req.into_body())
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "failed to build upstream request");
            return gateway_error();
        }
    };

    let upstream_resp = match state.client.request(upstream_req).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(error = %e, target = %target, "upstream request failed");
            return gateway_error();
        }
    };

    let status = upstream_resp.status();
    let headers = upstream_resp.headers().clone();

    let body_bytes = match upstream_resp.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::error!(error = %e, "failed to read upstream response body");
            return gateway_error();
        }
    };

    let mut response = Response::builder().status(status);
    for (key, value) in headers.iter() {
        // Skip hop-by-hop headers
        let k = key.as_str();
        if k == "transfer-encoding" || k == "connection" {
            continue;
        }
        response = response.header(key, value);
    }
    response = response
        .header("X-Cache", "BYPASS")
        .header("X-Cache-Strategy", Strategy::NetworkOnly.name());

    response.body(Body::from(body_bytes)).unwrap()
}

/// Build an HTTP response from a stored entry.
fn respond(stored: &StoredResponse, strategy: Strategy, cache_status: &str) -> Response<Body> {
    let mut response = Response::builder().status(stored.status);

    for (key, value) in &stored.headers {
        let k = key.as_str();
        if k == "transfer-encoding" || k == "connection" {
            continue;
        }
        if let Ok(v) = HeaderValue::from_str(value) {
            response = response.header(k, v);
        }
    }

    response = response
        .header("X-Cache", cache_status)
        .header("X-Cache-Strategy", strategy.name());

    response.body(Body::from(stored.body.clone())).unwrap()
}

fn gateway_error() -> Response<Body> {
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .body(Body::from("Bad Gateway"))
        .unwrap()
}
