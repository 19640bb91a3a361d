//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honour `RUST_LOG`, falling back to the configured level

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global fmt subscriber.
///
/// Fails (instead of panicking) if a subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Filter directive applying `level` to this crate and `warn` elsewhere.
pub fn default_filter(level: &str) -> String {
    format!("warn,indexer_client={}", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "warn,indexer_client=debug");
        assert!(EnvFilter::try_new(default_filter("info")).is_ok());
    }

    #[test]
    fn test_double_init_does_not_panic() {
        let _ = init_logging("info");
        assert!(init_logging("info").is_err());
    }
}
