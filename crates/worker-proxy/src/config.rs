use crate::proxy::WorkerState;
use crate::strategy::RouteRules;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub routes: RouteRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_control_addr")]
    pub control_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OriginConfig {
    #[serde(default = "default_origin_url")]
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Bumping the version invalidates every cache of the previous
    /// generation on the next activation sweep.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    /// URLs fetched into the static cache during install.
    #[serde(default)]
    pub precache: Vec<String>,
}

/// The versioned cache names currently considered valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub static_cache: String,
    pub pages: String,
    pub api: String,
}

impl CacheNames {
    pub fn valid(&self) -> Vec<String> {
        vec![
            self.static_cache.clone(),
            self.pages.clone(),
            self.api.clone(),
        ]
    }
}

impl CacheConfig {
    pub fn names(&self) -> CacheNames {
        let (prefix, v) = (&self.name_prefix, self.version);
        CacheNames {
            static_cache: format!("{prefix}-static-v{v}"),
            pages: format!("{prefix}-pages-v{v}"),
            api: format!("{prefix}-api-v{v}"),
        }
    }
}

impl WorkerConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: WorkerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        WorkerConfig {
            server: ServerConfig::default(),
            origin: OriginConfig::default(),
            cache: CacheConfig::default(),
            routes: RouteRules::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            control_addr: default_control_addr(),
        }
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: default_origin_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name_prefix: default_name_prefix(),
            precache: Vec::new(),
        }
    }
}

/// Compare old and new config, apply safe changes, reject unsafe ones.
///
/// - Cache version bump → swap config, sweep stale cache generations
/// - Route rules changed → swap config (applies to the next request)
/// - Addresses or origin changed → WARN log, ignore (restart required)
pub fn diff_and_apply(old: &WorkerConfig, new: &WorkerConfig, state: &Arc<WorkerState>) {
    if old.server.listen_addr != new.server.listen_addr
        || old.server.control_addr != new.server.control_addr
    {
        tracing::warn!("listen address change detected — ignoring. Restart to rebind");
    }

    if old.origin.url != new.origin.url || old.origin.timeout_ms != new.origin.timeout_ms {
        tracing::warn!(
            old = %old.origin.url,
            new = %new.origin.url,
            "origin change detected — ignoring. Restart to repoint the worker"
        );
    }

    let version_bumped =
        old.cache.version != new.cache.version || old.cache.name_prefix != new.cache.name_prefix;

    // Route and cache settings are safe to swap in place
    let mut applied = old.clone();
    applied.cache = new.cache.clone();
    applied.routes = new.routes.clone();
    state.config.store(Arc::new(applied));

    if version_bumped {
        crate::lifecycle::activate(state);
        tracing::info!(
            old_version = old.cache.version,
            new_version = new.cache.version,
            "config reloaded: cache version bumped, stale generations swept"
        );
    } else {
        tracing::info!("config reloaded");
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8787".to_string()
}
fn default_control_addr() -> String {
    "0.0.0.0:9787".to_string()
}
fn default_origin_url() -> String {
    "http://127.0.0.1:3000".to_string()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_version() -> u32 {
    1
}
fn default_name_prefix() -> String {
    "glide".to_string()
}
