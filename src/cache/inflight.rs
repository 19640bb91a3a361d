//! In-flight request de-duplication.
//!
//! # Responsibilities
//! - Guarantee at most one live network operation per request key
//! - Hand late arrivals the same eventual outcome as the first caller
//! - Deregister when the operation settles, whatever the outcome
//!
//! # Design Decisions
//! - Check-and-insert is one atomic step (DashMap entry API)
//! - Operations run on their own task: dropping a caller never cancels them
//! - Deregistration is an RAII guard so it also runs if the task panics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use crate::cache::key::RequestKey;
use crate::error::{QueryError, QueryResult};

/// Outcome of an in-flight operation, awaitable by any number of callers.
pub type SharedOutcome = Shared<BoxFuture<'static, QueryResult<Value>>>;

struct InFlightEntry {
    id: u64,
    operation: SharedOutcome,
}

/// How a caller was admitted for a key.
pub enum Admission {
    /// Another caller's operation is already running; await its outcome.
    Attached(SharedOutcome),
    /// This caller launched the operation.
    Started(SharedOutcome),
}

impl Admission {
    pub fn is_attached(&self) -> bool {
        matches!(self, Admission::Attached(_))
    }

    pub async fn outcome(self) -> QueryResult<Value> {
        match self {
            Admission::Attached(op) | Admission::Started(op) => op.await,
        }
    }
}

/// Map from request key to the operation currently serving it.
#[derive(Default)]
pub struct InFlightRegistry {
    entries: DashMap<RequestKey, InFlightEntry>,
    next_id: AtomicU64,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the operation serving `key`, or spawn `launch()` for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn join_or_begin<F>(self: &Arc<Self>, key: RequestKey, launch: F) -> Admission
    where
        F: FnOnce() -> BoxFuture<'static, QueryResult<Value>>,
    {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => Admission::Attached(entry.get().operation.clone()),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let guard = SettleGuard {
                    registry: Arc::clone(self),
                    key,
                    id,
                };
                let operation = launch();
                let handle = tokio::spawn(async move {
                    let _guard = guard;
                    operation.await
                });

                let shared = async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(QueryError::TaskFailed(e.to_string())),
                    }
                }
                .boxed()
                .shared();

                slot.insert(InFlightEntry {
                    id,
                    operation: shared.clone(),
                });
                Admission::Started(shared)
            }
        }
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn settle(&self, key: &RequestKey, id: u64) {
        self.entries.remove_if(key, |_, entry| entry.id == id);
    }
}

/// Removes the registry entry when the serving task ends.
struct SettleGuard {
    registry: Arc<InFlightRegistry>,
    key: RequestKey,
    id: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.registry.settle(&self.key, self.id);
    }
}
