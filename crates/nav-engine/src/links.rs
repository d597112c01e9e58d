use url::Url;

/// The attributes of an anchor that matter for interception decisions.
///
/// Hosts build one of these from whatever their DOM representation is; the
/// engine never sees an element.
#[derive(Debug, Clone, Default)]
pub struct LinkView {
    pub href: String,
    /// Explicit per-link opt-out (the `data-no-instant` escape hatch).
    pub no_instant: bool,
    /// Download links always go through the browser.
    pub download: bool,
    /// Links opening a new tab are left alone.
    pub target_blank: bool,
}

impl LinkView {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }
}

/// Decide whether a link is internal, navigable content.
///
/// This predicate is the single source of truth for both the navigation
/// controller and the prefetch scheduler — the two must never diverge on
/// what counts as interceptable.
pub fn is_navigable(link: &LinkView, origin_host: &str) -> bool {
    let href = link.href.as_str();
    if href.is_empty() {
        return false;
    }

    if link.no_instant || link.download || link.target_blank {
        return false;
    }

    // Fragment jumps and non-HTTP schemes stay native
    if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("tel:") {
        return false;
    }

    // Absolute URLs must point at our own host
    if href.starts_with("http://") || href.starts_with("https://") {
        match Url::parse(href) {
            Ok(parsed) => {
                if parsed.host_str() != Some(origin_host) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }

    // Cart and checkout must hit the platform directly
    if href.contains("/cart") || href.contains("/checkout") {
        return false;
    }

    true
}
