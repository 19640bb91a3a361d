//! Retry and endpoint failover.
//!
//! # Responsibilities
//! - Classify failures as transient (429, 5xx) or fatal (everything else)
//! - Re-run an attempt with exponential backoff + jitter on transient failures
//! - Rotate the endpoint pool after every transient failure
//!
//! # Design Decisions
//! - Application-level errors are fatal: the indexer answered and said no
//! - Network errors carry no status and are fatal as well
//! - A fatal failure never touches the pool cursor
//! - The last transient failure is returned as-is once attempts run out

use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::RetryConfig;
use crate::endpoint::EndpointPool;
use crate::error::{QueryError, QueryResult};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Retry budget and backoff shape for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_jitter_ms: config.max_jitter_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl RetryPolicy {
    /// Backoff after the failed attempt with the given 0-based index.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        calculate_backoff(attempt_index, self.base_delay_ms, self.max_jitter_ms, self.max_delay_ms)
    }
}

/// Whether a failure warrants failover and another attempt.
pub fn is_transient(err: &QueryError) -> bool {
    match err {
        QueryError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
        _ => false,
    }
}

/// Drive `attempt` against the pool's current endpoint until it succeeds,
/// fails fatally, or the attempt budget is spent.
pub async fn execute_with_failover<T, F, Fut>(
    policy: &RetryPolicy,
    pool: &EndpointPool,
    mut attempt: F,
) -> QueryResult<T>
where
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = QueryResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt_index = 0;

    loop {
        let endpoint = pool
            .current()
            .ok_or_else(|| QueryError::Configuration("no indexer endpoint configured".to_string()))?;

        let err = match attempt(endpoint.clone()).await {
            Ok(value) => {
                metrics::record_attempt(&endpoint, "success");
                return Ok(value);
            }
            Err(err) => err,
        };
        metrics::record_attempt(&endpoint, err.kind());

        if !is_transient(&err) {
            tracing::warn!(endpoint = %endpoint, attempt = attempt_index + 1, error = %err, "Fatal indexer failure");
            return Err(err);
        }

        let next = pool.rotate();
        if next.as_ref() != Some(&endpoint) {
            metrics::record_failover();
        }

        attempt_index += 1;
        if attempt_index >= max_attempts {
            tracing::warn!(
                endpoint = %endpoint,
                attempts = attempt_index,
                error = %err,
                "Retry budget exhausted"
            );
            return Err(err);
        }

        let delay = policy.delay_for(attempt_index - 1);
        tracing::info!(
            failed = %endpoint,
            next = ?next.as_ref().map(Url::as_str),
            attempt = attempt_index,
            delay = ?delay,
            error = %err,
            "Transient indexer failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
