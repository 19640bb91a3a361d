//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint URLs (absolute http/https)
//! - Validate value ranges (burst > 0, capacity > 0, attempts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// Slowest accepted throttle: one request per hour.
pub const MIN_REQUESTS_PER_SECOND: f64 = 1.0 / 3600.0;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("at least one endpoint is required")]
    NoEndpoints,

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("rate_limit.burst_size must be at least 1")]
    ZeroBurst,

    #[error("rate_limit.requests_per_second must be positive")]
    NonPositiveRate,

    #[error("rate_limit.requests_per_second must be at least {min} (got {rate})")]
    RateTooLow { rate: f64, min: f64 },

    #[error("cache.capacity must be at least 1")]
    ZeroCacheCapacity,

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Check an endpoint string, returning the parsed URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for raw in &config.endpoints {
        if let Err(e) = parse_endpoint(raw) {
            errors.push(e);
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::ZeroBurst);
        }
        let rate = config.rate_limit.requests_per_second;
        if !(rate > 0.0) {
            errors.push(ValidationError::NonPositiveRate);
        } else if rate < MIN_REQUESTS_PER_SECOND {
            errors.push(ValidationError::RateTooLow {
                rate,
                min: MIN_REQUESTS_PER_SECOND,
            });
        }
    }

    if config.cache.capacity == 0 {
        errors.push(ValidationError::ZeroCacheCapacity);
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let mut config = ClientConfig::default();
        config.endpoints = vec![
            "https://indexer.example/graphql".into(),
            "http://127.0.0.1:8000/subgraphs/name/app".into(),
        ];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.rate_limit.burst_size = 0;
        config.rate_limit.requests_per_second = 0.0;
        config.cache.capacity = 0;
        config.retries.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NoEndpoints,
                ValidationError::ZeroBurst,
                ValidationError::NonPositiveRate,
                ValidationError::ZeroCacheCapacity,
                ValidationError::ZeroAttempts,
            ]
        );
    }

    #[test]
    fn test_rate_ignored_when_disabled() {
        let mut config = ClientConfig::default();
        config.endpoints = vec!["https://indexer.example/graphql".into()];
        config.rate_limit.enabled = false;
        config.rate_limit.requests_per_second = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_vanishing_rate() {
        let mut config = ClientConfig::default();
        config.endpoints = vec!["https://indexer.example/graphql".into()];
        config.rate_limit.requests_per_second = 1e-20;

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::RateTooLow { .. }]));

        config.rate_limit.requests_per_second = MIN_REQUESTS_PER_SECOND;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(ValidationError::InvalidEndpoint { .. })
        ));
        let err = parse_endpoint("ws://indexer.example/graphql").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ws'"));
    }
}
