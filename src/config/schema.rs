//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the indexer client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Indexer GraphQL endpoints. The first is the primary, the rest are mirrors.
    pub endpoints: Vec<String>,

    /// Outbound rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Retry and failover configuration.
    pub retries: RetryConfig,

    /// HTTP client timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Token bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Bucket capacity (requests that may fire back to back).
    pub burst_size: u32,

    /// Tokens refilled per second.
    pub requests_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst_size: 6,
            requests_per_second: 4.0,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached results.
    pub capacity: usize,

    /// TTL used by `IndexerClient::query`. Zero or negative disables caching.
    pub default_ttl_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 250,
            default_ttl_ms: 30_000,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound of the random jitter added to each delay.
    pub max_jitter_ms: u64,

    /// Maximum exponential delay in milliseconds (before jitter).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 400,
            max_jitter_ms: 200,
            max_delay_ms: 30_000,
        }
    }
}

/// HTTP client timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-attempt request timeout in seconds (0 = none).
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.endpoints.is_empty());
        assert_eq!(config.rate_limit.burst_size, 6);
        assert_eq!(config.rate_limit.requests_per_second, 4.0);
        assert_eq!(config.cache.capacity, 250);
        assert_eq!(config.retries.max_attempts, 5);
        assert_eq!(config.retries.base_delay_ms, 400);
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            endpoints = ["https://indexer.example/graphql"]

            [retries]
            max_attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.retries.max_attempts, 2);
        assert_eq!(config.retries.base_delay_ms, 400);
        assert!(config.rate_limit.enabled);
    }
}
