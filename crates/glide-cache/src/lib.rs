//! In-memory primitives for the instant-navigation engine.
//!
//! Two independent pieces live here:
//!
//! - A bounded page cache: parsed page documents keyed by URL, stored in an
//!   arena-allocated linked list with a pluggable eviction policy (FIFO by
//!   insertion order, or LRU).
//! - A [`flight::FlightTable`]: a keyed table of shared futures so that any
//!   number of concurrent requesters for the same URL ride a single
//!   underlying fetch.

pub mod arena;
pub mod document;
pub mod fifo;
pub mod flight;
pub mod lru;
