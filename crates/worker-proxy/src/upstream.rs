use crate::store::StoredResponse;
use axum::body::Body;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type HttpClient = Client<hyper_util::client::legacy::connect::HttpConnector, Body>;

/// Upstream fetch failure — connect error, timeout, or a garbled exchange.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UpstreamError {}

/// The network leg the caching strategies pull on.
///
/// Object-safe so strategy execution is testable with a scripted origin
/// instead of a live socket.
pub trait OriginClient: Send + Sync + 'static {
    /// GET a target and collect the full response.
    ///
    /// `target` is an origin-relative path-and-query, or an absolute URL
    /// for CDN-hosted assets.
    fn get(&self, target: &str) -> BoxFuture<'static, Result<StoredResponse, UpstreamError>>;
}

/// Production origin client over the shared hyper client.
pub struct HyperOrigin {
    client: HttpClient,
    base: String,
    timeout: Duration,
}

impl HyperOrigin {
    pub fn new(client: HttpClient, base: String, timeout: Duration) -> Self {
        Self {
            client,
            base,
            timeout,
        }
    }

    fn absolute(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.base.trim_end_matches('/'), target)
        }
    }
}

impl OriginClient for HyperOrigin {
    fn get(&self, target: &str) -> BoxFuture<'static, Result<StoredResponse, UpstreamError>> {
        let client = self.client.clone();
        let uri = self.absolute(target);
        let timeout = self.timeout;

        async move {
            let request = axum::http::Request::builder()
                .method(axum::http::Method::GET)
                .uri(&uri)
                .body(Body::empty())
                .map_err(|e| UpstreamError::new(format!("bad upstream request: {e}")))?;

            let response = tokio::time::timeout(timeout, client.request(request))
                .await
                .map_err(|_| UpstreamError::new(format!("upstream timeout after {timeout:?}")))?
                .map_err(|e| UpstreamError::new(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                .collect();

            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| UpstreamError::new(format!("body read failed: {e}")))?
                .to_bytes();

            Ok(StoredResponse {
                status,
                headers,
                body,
                stored_at: Instant::now(),
            })
        }
        .boxed()
    }
}
