use axum::http::Method;
use serde::Deserialize;

/// The four ways the worker may satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
    NetworkOnly,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
            Strategy::NetworkOnly => "network-only",
        }
    }
}

/// Everything classification is allowed to look at. Derivable from the
/// request alone — no round-trip, no state.
#[derive(Debug, Clone)]
pub struct RequestShape {
    pub method: Method,
    pub path: String,
    /// Host component of absolute-form request URLs (CDN assets); `None`
    /// for ordinary origin-form requests.
    pub host: Option<String>,
    pub accept: Option<String>,
}

/// Path/host patterns feeding the strategy decision, straight from config.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRules {
    #[serde(default = "default_assets_prefix")]
    pub assets_prefix: String,
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,
    #[serde(default)]
    pub cdn_hosts: Vec<String>,
    /// Exact API paths (e.g. `/products.json`, `/cart.js`).
    #[serde(default = "default_api_exact")]
    pub api_exact: Vec<String>,
    /// Prefixes that are API-shaped regardless of extension (e.g. `/search`).
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,
    /// Prefixes that are API-shaped only for `.json` documents
    /// (e.g. `/collections/<handle>.json`).
    #[serde(default = "default_api_json_prefixes")]
    pub api_json_prefixes: Vec<String>,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            assets_prefix: default_assets_prefix(),
            asset_extensions: default_asset_extensions(),
            cdn_hosts: Vec::new(),
            api_exact: default_api_exact(),
            api_prefixes: default_api_prefixes(),
            api_json_prefixes: default_api_json_prefixes(),
        }
    }
}

impl RouteRules {
    pub fn is_static_asset(&self, path: &str, host: Option<&str>) -> bool {
        if let Some(host) = host {
            if self.cdn_hosts.iter().any(|h| h == host) {
                return true;
            }
        }
        if path.starts_with(&self.assets_prefix) {
            return true;
        }
        self.asset_extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{ext}")))
    }

    pub fn is_api_path(&self, path: &str) -> bool {
        if self.api_exact.iter().any(|p| p == path) {
            return true;
        }
        if self.api_prefixes.iter().any(|p| path.starts_with(p)) {
            return true;
        }
        self.api_json_prefixes
            .iter()
            .any(|p| path.starts_with(p) && path.ends_with(".json"))
    }

    fn is_document_request(&self, shape: &RequestShape) -> bool {
        shape.method == Method::GET
            && shape
                .accept
                .as_deref()
                .map(|a| a.contains("text/html"))
                .unwrap_or(false)
    }

    /// Pick the strategy for a request shape.
    ///
    /// Pure and order-sensitive: static beats API beats document; anything
    /// left is passed through untouched.
    pub fn classify(&self, shape: &RequestShape) -> Strategy {
        if self.is_static_asset(&shape.path, shape.host.as_deref()) {
            return Strategy::CacheFirst;
        }
        if self.is_api_path(&shape.path) {
            return Strategy::NetworkFirst;
        }
        if self.is_document_request(shape) {
            return Strategy::StaleWhileRevalidate;
        }
        Strategy::NetworkOnly
    }
}

fn default_assets_prefix() -> String {
    "/assets/".to_string()
}
fn default_asset_extensions() -> Vec<String> {
    ["css", "js", "svg", "png", "jpg", "webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_api_exact() -> Vec<String> {
    vec!["/products.json".to_string(), "/cart.js".to_string()]
}
fn default_api_prefixes() -> Vec<String> {
    vec!["/search".to_string()]
}
fn default_api_json_prefixes() -> Vec<String> {
    vec!["/collections/".to_string(), "/products/".to_string()]
}
