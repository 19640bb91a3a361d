//! Result caching and request coalescing.
//!
//! # Data Flow
//! ```text
//! (endpoint, query, variables)
//!     → key.rs (canonical RequestKey)
//!     → store.rs (fresh hit? return it)
//!     → inflight.rs (same key already running? attach to it)
//!     → otherwise launch, then populate store.rs on success
//! ```
//!
//! # Design Decisions
//! - Keys embed the endpoint, so mirrors never share entries
//! - LRU order is access order: reads refresh an entry's position
//! - Expired entries are dropped lazily, on read

pub mod inflight;
pub mod key;
pub mod store;

pub use inflight::{Admission, InFlightRegistry};
pub use key::{RequestKey, Variables};
pub use store::ResultCache;
