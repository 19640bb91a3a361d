//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! GraphQlRequest {query, variables}
//!     → Transport::post (one HTTP POST to one endpoint)
//!     → RawResponse {status, body}
//!     → types::classify
//!         - non-2xx            → QueryError::Http
//!         - 2xx + errors       → QueryError::Application
//!         - otherwise          → data
//! ```
//!
//! # Design Decisions
//! - Transports only report network failures; classification is shared
//! - The trait is object safe so tests can script responses

pub mod http;
pub mod types;

use futures_util::future::BoxFuture;
use url::Url;

use crate::error::QueryResult;

pub use http::HttpTransport;
pub use types::{classify, GraphQlRequest, GraphQlResponse, RawResponse};

/// Performs a single network exchange with one endpoint.
pub trait Transport: Send + Sync {
    /// POST `request` as JSON to `endpoint`.
    ///
    /// Errors must be [`QueryError::Transport`](crate::error::QueryError::Transport):
    /// any HTTP status, good or bad, is returned as a [`RawResponse`].
    fn post<'a>(&'a self, endpoint: &'a Url, request: &'a GraphQlRequest) -> BoxFuture<'a, QueryResult<RawResponse>>;
}
