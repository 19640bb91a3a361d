//! GraphQL wire types and response classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::key::Variables;
use crate::error::{QueryError, QueryResult};

/// Body of one GraphQL POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Variables,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>, variables: Variables) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// Response envelope `{ "data"?: any, "errors"?: any[] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Status and body of one HTTP exchange, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turn a raw exchange into data or a classified failure.
///
/// Priority: non-2xx status, then query-level `errors`, then `data`.
pub fn classify(raw: RawResponse) -> QueryResult<Value> {
    if !raw.is_success() {
        return Err(QueryError::Http {
            status: raw.status,
            body: raw.body,
        });
    }

    let envelope: GraphQlResponse = serde_json::from_str(&raw.body)
        .map_err(|e| QueryError::Transport(format!("malformed response body: {}", e)))?;

    match envelope.errors {
        None | Some(Value::Null) => {}
        Some(Value::Array(errors)) if errors.is_empty() => {}
        Some(Value::Array(errors)) => return Err(QueryError::Application { errors }),
        Some(other) => return Err(QueryError::Application { errors: vec![other] }),
    }

    Ok(envelope.data.unwrap_or(Value::Null))
}
