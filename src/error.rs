//! Query error taxonomy.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`IndexerClient`](crate::client::IndexerClient).
///
/// The type is `Clone` because a single in-flight outcome is delivered to
/// every caller attached to it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// No usable endpoint is configured. Raised before cache or network.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The indexer answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The indexer answered 2xx but rejected the query.
    #[error("indexer rejected query: {}", summarize(.errors))]
    Application { errors: Vec<Value> },

    /// Network-level failure with no HTTP status to classify.
    #[error("transport error: {0}")]
    Transport(String),

    /// Caller-side deadline elapsed. The underlying request keeps running.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The `data` payload did not match the requested type.
    #[error("failed to decode response data: {0}")]
    Decode(String),

    /// The background task serving an in-flight request died.
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl QueryError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Configuration(_) => "configuration",
            QueryError::Http { .. } => "http",
            QueryError::Application { .. } => "application",
            QueryError::Transport(_) => "transport",
            QueryError::Timeout(_) => "timeout",
            QueryError::Decode(_) => "decode",
            QueryError::TaskFailed(_) => "task_failed",
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for indexer queries.
pub type QueryResult<T> = Result<T, QueryError>;

fn summarize(errors: &[Value]) -> String {
    let messages: Vec<String> = errors
        .iter()
        .map(|e| match e.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => e.to_string(),
        })
        .collect();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = QueryError::Http { status: 503, body: "overloaded".into() };
        assert_eq!(err.to_string(), "HTTP 503: overloaded");
        assert_eq!(err.status(), Some(503));

        let err = QueryError::Application {
            errors: vec![json!({"message": "unknown field `foo`"}), json!("bare")],
        };
        assert_eq!(err.to_string(), "indexer rejected query: unknown field `foo`; \"bare\"");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(QueryError::Configuration("x".into()).kind(), "configuration");
        assert_eq!(QueryError::Transport("refused".into()).kind(), "transport");
        assert_eq!(QueryError::Timeout(Duration::from_secs(1)).kind(), "timeout");
    }
}
