//! Instant navigation for a storefront: fetch pages over XHR-style requests,
//! swap the interesting regions into the live document, and keep a bounded
//! page cache warm through speculative prefetching.
//!
//! The moving parts, leaves first:
//!
//! - [`cache::PageCache`] — bounded page store (policy from `glide-cache`)
//! - [`controller::NavigationController`] — single owner of the cache, the
//!   in-flight table and the navigation state machine
//! - [`prefetch::PrefetchScheduler`] — hover/touch/idle-driven cache warming,
//!   always going through the controller
//! - [`transition::TransitionRenderer`] — commits a document into a
//!   [`host::DocumentHost`] with a grouped transition or a manual fade
//!
//! Nothing here talks to a concrete browser: the document, history and
//! network edges are traits, with simulation implementations used by the
//! tests and the session driver.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod host;
pub mod links;
pub mod prefetch;
pub mod prefs;
pub mod transition;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::NavConfig;
pub use controller::{NavigationController, NavigationOutcome, NavigationState};
pub use prefetch::PrefetchScheduler;
