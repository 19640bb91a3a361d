//! reqwest-backed transport.

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::{QueryError, QueryResult};
use crate::transport::types::{GraphQlRequest, RawResponse};
use crate::transport::Transport;

/// POSTs GraphQL documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeouts: &TimeoutConfig) -> QueryResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("indexer-client/", env!("CARGO_PKG_VERSION")));
        if timeouts.connect_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
        }
        if timeouts.request_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeouts.request_secs));
        }

        let client = builder
            .build()
            .map_err(|e| QueryError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post<'a>(&'a self, endpoint: &'a Url, request: &'a GraphQlRequest) -> BoxFuture<'a, QueryResult<RawResponse>> {
        async move {
            let response = self
                .client
                .post(endpoint.clone())
                .json(request)
                .send()
                .await
                .map_err(|e| QueryError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| QueryError::Transport(format!("failed to read response body: {}", e)))?;

            tracing::trace!(endpoint = %endpoint, status, bytes = body.len(), "Indexer responded");
            Ok(RawResponse { status, body })
        }
        .boxed()
    }
}
