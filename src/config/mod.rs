//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, INDEXER_ENDPOINTS override)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once by IndexerClient::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new client is built for a new config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Programmatic configs skip validation; an empty endpoint list then
//!   fails each request instead of construction

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ClientConfig;
pub use schema::{CacheConfig, ObservabilityConfig, RateLimitConfig, RetryConfig, TimeoutConfig};
