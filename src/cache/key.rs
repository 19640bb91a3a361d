//! Request variables and cache key derivation.
//!
//! # Responsibilities
//! - Hold GraphQL variables as a JSON object
//! - Encode arbitrary-precision integers as decimal text
//! - Derive a deterministic key from (endpoint, query, variables)

use std::fmt;
use std::fmt::Write as _;

use alloy::primitives::{I256, U256};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use url::Url;

use crate::error::{QueryError, QueryResult};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// GraphQL variables of one request.
///
/// Big integers (token amounts, block numbers beyond 2^53) are stored as
/// decimal strings, which is what the indexer's `BigInt` scalar accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Variables(Map<String, Value>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a JSON object (or `null`, meaning no variables).
    pub fn from_json(value: Value) -> QueryResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(QueryError::Configuration(format!(
                "variables must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn set_uint(self, name: impl Into<String>, value: U256) -> Self {
        self.set(name, value.to_string())
    }

    pub fn set_int(self, name: impl Into<String>, value: I256) -> Self {
        self.set(name, value.to_string())
    }

    pub fn set_u128(self, name: impl Into<String>, value: u128) -> Self {
        self.set(name, value.to_string())
    }

    pub fn set_i128(self, name: impl Into<String>, value: i128) -> Self {
        self.set(name, value.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Deterministic identity of a request against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn derive(endpoint: &Url, query: &str, variables: &Variables) -> Self {
        let mut key = String::with_capacity(endpoint.as_str().len() + query.len() + 32);
        key.push('[');
        write_string(&mut key, endpoint.as_str());
        key.push(',');
        write_string(&mut key, query);
        key.push(',');
        write_object(&mut key, variables.as_map());
        key.push(']');
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order-independent JSON rendering with normalized integers.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(out, map),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (name, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, name);
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{}", i);
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{}", u);
    } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER) {
        let _ = write!(out, "{}", f as i64);
    } else {
        let _ = write!(out, "{}", n);
    }
}

fn write_string(out: &mut String, s: &str) {
    // Display of a JSON string value is its escaped, quoted form.
    let _ = write!(out, "{}", Value::from(s));
}
