//! Endpoint selection subsystem.
//!
//! # Data Flow
//! ```text
//! ClientConfig.endpoints
//!     → pool.rs (parse, keep order: primary then mirrors)
//!     → current() picks the endpoint for each attempt
//!     → rotate() on transient failure (429 / 5xx)
//! ```
//!
//! # Design Decisions
//! - Round-robin only; no health scoring
//! - Rotation is driven by the retry orchestrator, never by fatal errors

pub mod pool;

pub use pool::EndpointPool;
