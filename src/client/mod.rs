//! Request facade.
//!
//! # Data Flow
//! ```text
//! request(query, variables, ttl_ms)
//!     → EndpointPool::current (key scope)
//!     → RequestKey::derive
//!     → ResultCache::get (ttl > 0 only)          → hit: return payload
//!     → InFlightRegistry::join_or_begin          → attached: await shared outcome
//!         → RateLimiter::acquire
//!         → execute_with_failover(Transport::post + classify)
//!         → ResultCache::set (success, ttl > 0)
//!     → outcome delivered to every waiter
//! ```
//!
//! # Design Decisions
//! - All state lives in one client object; clones share it
//! - Caller deadlines never cancel the underlying operation

pub mod indexer;

pub use indexer::IndexerClient;
