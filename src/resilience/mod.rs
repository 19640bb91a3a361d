//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! New (non-deduplicated) request:
//!     → rate_limit.rs (wait for a token from the shared bucket)
//!     → retries.rs (attempt against current endpoint)
//!     → On 429/5xx: rotate endpoint, backoff.rs delay, attempt again
//!     → On anything else: surface immediately
//! ```
//!
//! # Design Decisions
//! - One limiter per client; it bounds total volume, not per-key volume
//! - Limiter waiters sleep until the exact refill instant, FIFO
//! - Jittered backoff prevents synchronized retries across callers
//! - No deadlines inside the core; callers race their own timers

pub mod backoff;
pub mod rate_limit;
pub mod retries;

pub use rate_limit::RateLimiter;
pub use retries::{execute_with_failover, is_transient, RetryPolicy};
