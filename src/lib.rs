//! Resilient GraphQL indexer client.
//!
//! Sends GraphQL queries to an indexing service through a pool of
//! interchangeable endpoints, with token-bucket throttling, an LRU result
//! cache with per-request TTL, coalescing of identical concurrent requests,
//! and retry with endpoint failover on transient failures.
//!
//! ```no_run
//! use indexer_client::{ClientConfig, IndexerClient, Variables};
//!
//! # async fn run() -> indexer_client::QueryResult<()> {
//! let mut config = ClientConfig::default();
//! config.endpoints = vec!["https://indexer.example/graphql".to_string()];
//! let client = IndexerClient::new(&config)?;
//!
//! let data = client
//!     .request("query($n: Int) { blocks(first: $n) { number } }", Variables::new().set("n", 5), 30_000)
//!     .await?;
//! println!("{}", data);
//! # Ok(())
//! # }
//! ```

// Request path
pub mod cache;
pub mod client;
pub mod endpoint;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;

pub use cache::Variables;
pub use client::IndexerClient;
pub use config::ClientConfig;
pub use error::{QueryError, QueryResult};
pub use transport::{GraphQlRequest, RawResponse, Transport};
