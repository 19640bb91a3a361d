//! Round-robin endpoint pool.
//!
//! # Responsibilities
//! - Hold the ordered endpoint list (primary first, then mirrors)
//! - Track the currently-selected endpoint
//! - Rotate to the next endpoint after a transient failure

use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

use crate::config::validation::parse_endpoint;

/// Ordered endpoints plus a selection cursor.
///
/// Rotation is pure round-robin: no health is tracked, so an endpoint that
/// just failed can be selected again by a later request.
#[derive(Debug, Default)]
pub struct EndpointPool {
    endpoints: Vec<Url>,
    cursor: AtomicUsize,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<Url>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Build a pool from raw strings, skipping entries that do not parse.
    pub fn from_urls(urls: &[String]) -> Self {
        let mut endpoints = Vec::with_capacity(urls.len());
        for raw in urls {
            match parse_endpoint(raw) {
                Ok(url) => endpoints.push(url),
                Err(e) => tracing::warn!(url = %raw, error = %e, "Ignoring invalid endpoint"),
            }
        }
        if endpoints.is_empty() {
            tracing::warn!("No usable indexer endpoint configured; every request will fail");
        } else {
            tracing::info!(count = endpoints.len(), primary = %endpoints[0], "Endpoint pool initialized");
        }
        Self::new(endpoints)
    }

    /// Endpoint under the cursor, `None` when the pool is empty.
    pub fn current(&self) -> Option<Url> {
        if self.endpoints.is_empty() {
            return None;
        }
        Some(self.endpoints[self.cursor()].clone())
    }

    /// Advance the cursor and return the newly selected endpoint.
    ///
    /// A pool with a single endpoint (or none) is left untouched.
    pub fn rotate(&self) -> Option<Url> {
        let len = self.endpoints.len();
        if len > 1 {
            // The closure always returns Some, so the update cannot fail.
            let _ = self
                .cursor
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len));
        }
        self.current()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }
}
