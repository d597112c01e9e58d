use serde::Deserialize;
use std::path::Path;

/// Engine configuration, loadable from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NavConfig {
    /// Host considered "our" origin; links elsewhere are never intercepted.
    #[serde(default = "default_origin_host")]
    pub origin_host: String,
    /// Maximum number of pages kept in the in-memory cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Page-cache eviction policy: "fifo" or "lru".
    #[serde(default = "default_eviction_policy")]
    pub eviction_policy: String,
    /// How long the pointer must rest on a link before it is prefetched.
    #[serde(default = "default_hover_delay_ms")]
    pub hover_delay_ms: u64,
    /// Minimum interval between successive hover-triggered prefetches.
    #[serde(default = "default_prefetch_interval_ms")]
    pub prefetch_interval_ms: u64,
    /// How many visible links the idle scan may prefetch.
    #[serde(default = "default_idle_prefetch_limit")]
    pub idle_prefetch_limit: usize,
    /// Manual fade duration used when no grouped transition is available.
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    /// Selector for the main content container.
    #[serde(default = "default_main_selector")]
    pub main_selector: String,
    /// Selectors for secondary regions swapped alongside the main content.
    #[serde(default = "default_secondary_selectors")]
    pub secondary_selectors: Vec<String>,
}

impl NavConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: NavConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            origin_host: default_origin_host(),
            cache_capacity: default_cache_capacity(),
            eviction_policy: default_eviction_policy(),
            hover_delay_ms: default_hover_delay_ms(),
            prefetch_interval_ms: default_prefetch_interval_ms(),
            idle_prefetch_limit: default_idle_prefetch_limit(),
            fade_ms: default_fade_ms(),
            main_selector: default_main_selector(),
            secondary_selectors: default_secondary_selectors(),
        }
    }
}

fn default_origin_host() -> String {
    "localhost".to_string()
}
fn default_cache_capacity() -> usize {
    50
}
fn default_eviction_policy() -> String {
    "fifo".to_string()
}
fn default_hover_delay_ms() -> u64 {
    80
}
fn default_prefetch_interval_ms() -> u64 {
    200
}
fn default_idle_prefetch_limit() -> usize {
    3
}
fn default_fade_ms() -> u64 {
    150
}
fn default_main_selector() -> String {
    "#MainContent".to_string()
}
fn default_secondary_selectors() -> Vec<String> {
    vec![".breadcrumbs".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = NavConfig::default();
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.eviction_policy, "fifo");
        assert!(config.hover_delay_ms >= 65 && config.hover_delay_ms <= 100);
        assert_eq!(config.main_selector, "#MainContent");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: NavConfig = toml::from_str(
            r#"
            origin_host = "shop.example.com"
            cache_capacity = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.origin_host, "shop.example.com");
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.eviction_policy, "fifo");
        assert_eq!(config.idle_prefetch_limit, 3);
    }
}
