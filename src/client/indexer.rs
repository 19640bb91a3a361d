//! Resilient GraphQL indexer client.
//!
//! # Responsibilities
//! - Derive request keys and serve fresh results from the cache
//! - Coalesce identical concurrent requests into one operation
//! - Throttle, retry and fail over the operations that do hit the network
//! - Populate the cache and deliver one outcome to every waiter

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;

use crate::cache::{Admission, InFlightRegistry, RequestKey, ResultCache, Variables};
use crate::config::ClientConfig;
use crate::endpoint::EndpointPool;
use crate::error::{QueryError, QueryResult};
use crate::observability::metrics;
use crate::resilience::{execute_with_failover, RateLimiter, RetryPolicy};
use crate::transport::{classify, GraphQlRequest, HttpTransport, Transport};

/// Client for a GraphQL indexing service.
///
/// Cloning is cheap and clones share all state (cache, limiter, in-flight
/// map, endpoint cursor). Separately constructed clients share nothing.
#[derive(Clone)]
pub struct IndexerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    pool: EndpointPool,
    limiter: RateLimiter,
    cache: ResultCache,
    in_flight: Arc<InFlightRegistry>,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    default_ttl_ms: i64,
}

impl IndexerClient {
    /// Create a client talking HTTP to the configured endpoints.
    pub fn new(config: &ClientConfig) -> QueryResult<Self> {
        let transport = HttpTransport::new(&config.timeouts)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let inner = ClientInner {
            pool: EndpointPool::from_urls(&config.endpoints),
            limiter: RateLimiter::from_config(&config.rate_limit),
            cache: ResultCache::new(config.cache.capacity),
            in_flight: Arc::new(InFlightRegistry::new()),
            transport,
            retry: RetryPolicy::from(&config.retries),
            default_ttl_ms: config.cache.default_ttl_ms,
        };
        tracing::debug!(
            endpoints = inner.pool.len(),
            cache_capacity = inner.cache.capacity(),
            max_attempts = inner.retry.max_attempts,
            "Indexer client created"
        );
        Self { inner: Arc::new(inner) }
    }

    /// Run `query` with `variables`, caching a success for `ttl_ms`.
    ///
    /// A `ttl_ms` of zero or less bypasses the cache for both read and write;
    /// identical concurrent calls are still coalesced.
    pub async fn request(&self, query: &str, variables: Variables, ttl_ms: i64) -> QueryResult<Value> {
        let started = Instant::now();
        let result = self.dispatch(query, variables, ttl_ms).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_request(outcome, started);
        result
    }

    /// [`request`](Self::request) with the configured default TTL.
    pub async fn query(&self, query: &str, variables: Variables) -> QueryResult<Value> {
        self.request(query, variables, self.inner.default_ttl_ms).await
    }

    /// [`request`](Self::request), deserializing `data` into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Variables,
        ttl_ms: i64,
    ) -> QueryResult<T> {
        let data = self.request(query, variables, ttl_ms).await?;
        serde_json::from_value(data).map_err(|e| QueryError::Decode(e.to_string()))
    }

    /// [`request`](Self::request) bounded by a caller-side deadline.
    ///
    /// On timeout the underlying operation keeps running and still
    /// populates the cache and any other waiters.
    pub async fn request_within(
        &self,
        query: &str,
        variables: Variables,
        ttl_ms: i64,
        deadline: Duration,
    ) -> QueryResult<Value> {
        match tokio::time::timeout(deadline, self.request(query, variables, ttl_ms)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(deadline = ?deadline, "Caller deadline elapsed");
                Err(QueryError::Timeout(deadline))
            }
        }
    }

    pub fn current_endpoint(&self) -> Option<Url> {
        self.inner.pool.current()
    }

    pub fn endpoint_cursor(&self) -> usize {
        self.inner.pool.cursor()
    }

    pub fn endpoints(&self) -> &[Url] {
        self.inner.pool.endpoints()
    }

    pub fn cached_entries(&self) -> usize {
        self.inner.cache.len()
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    async fn dispatch(&self, query: &str, variables: Variables, ttl_ms: i64) -> QueryResult<Value> {
        let endpoint = self
            .inner
            .pool
            .current()
            .ok_or_else(|| QueryError::Configuration("no indexer endpoint configured".to_string()))?;

        let key = RequestKey::derive(&endpoint, query, &variables);
        let ttl = ttl_from_millis(ttl_ms);

        if ttl.is_some() {
            if let Some(payload) = self.inner.cache.get(&key) {
                metrics::record_cache_hit();
                tracing::debug!(endpoint = %endpoint, "Cache hit");
                return Ok(payload);
            }
            metrics::record_cache_miss();
        }

        let inner = Arc::clone(&self.inner);
        let request = GraphQlRequest::new(query, variables);
        let operation_key = key.clone();
        let admission = self.inner.in_flight.join_or_begin(key, move || {
            async move { inner.execute(operation_key, request, ttl).await }.boxed()
        });

        if let Admission::Attached(_) = &admission {
            metrics::record_inflight_attach();
            tracing::debug!(endpoint = %endpoint, "Attached to in-flight request");
        }
        admission.outcome().await
    }
}

impl ClientInner {
    /// Throttled, retried network operation for one key.
    async fn execute(&self, key: RequestKey, request: GraphQlRequest, ttl: Option<Duration>) -> QueryResult<Value> {
        let waited = self.limiter.acquire().await;
        metrics::record_limiter_wait(waited);
        if !waited.is_zero() {
            tracing::debug!(waited = ?waited, "Rate limiter delayed request");
        }

        let transport = self.transport.as_ref();
        let request = &request;
        let outcome = execute_with_failover(&self.retry, &self.pool, move |endpoint| async move {
            let raw = transport.post(&endpoint, request).await?;
            classify(raw)
        })
        .await;

        if let (Ok(data), Some(ttl)) = (&outcome, ttl) {
            self.cache.set(key, data.clone(), ttl);
        }
        outcome
    }
}

impl std::fmt::Debug for IndexerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerClient")
            .field("endpoints", &self.inner.pool.endpoints())
            .field("cursor", &self.inner.pool.cursor())
            .field("cached", &self.inner.cache.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish()
    }
}

fn ttl_from_millis(ttl_ms: i64) -> Option<Duration> {
    u64::try_from(ttl_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
