//! Asynchronous domain actions.
//!
//! Every action follows the same shape: dispatch a start transition, wait
//! out the simulated latency, do its work against [`Persistence`], then
//! dispatch a success or failure transition. The returned
//! [`ActionResult`] carries the same outcome; no action panics or lets an
//! internal error escape in any other form.

mod auth;
mod events;
mod navigation;
mod registrations;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{Instrument, debug, info_span, warn};

use crate::clock::{Clock, IdSource, Latency, SystemClock};
use crate::config::Config;
use crate::error::ErrorKind;
use crate::kv::{KvBackend, StorageError};
use crate::persistence::Persistence;
use crate::state::{StateStore, Transition};

pub use auth::TOKEN_PREFIX;

/// User-facing failure messages.
pub mod messages {
    pub const EVENT_NOT_FOUND: &str = "Event not found";
    pub const MISSING_EVENT_ID: &str = "Missing event id";
    pub const LOGIN_REQUIRED: &str = "You must be logged in to register for an event";
    pub const ALREADY_REGISTERED: &str = "You are already registered for this event";
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
}

/// A failed action: a kind for callers and a message for people.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthRequired, message)
    }
}

impl From<StorageError> for ActionError {
    fn from(e: StorageError) -> Self {
        Self::new(ErrorKind::StorageDegraded, format!("Storage unavailable: {e}"))
    }
}

/// Outcome of an action.
pub type ActionResult<T> = Result<T, ActionError>;

/// Render an outcome as `{"success": true, "<key>": payload}` or
/// `{"success": false, "error": message}`.
pub fn to_response<T: Serialize>(result: &ActionResult<T>, key: &str) -> Value {
    match result {
        Ok(payload) => {
            let mut body = json!({ "success": true });
            if let Ok(value) = serde_json::to_value(payload)
                && !value.is_null()
            {
                body[key] = value;
            }
            body
        }
        Err(e) => json!({
            "success": false,
            "error": e.message,
            "kind": e.kind,
        }),
    }
}

/// One write lock per collection.
#[derive(Debug, Default)]
struct CollectionLocks {
    events: Mutex<()>,
    registrations: Mutex<()>,
    users: Mutex<()>,
}

/// Entry point for every domain action.
pub struct Actions<B> {
    persistence: Persistence<B>,
    store: Arc<StateStore>,
    latency: Latency,
    clock: Arc<dyn Clock>,
    ids: IdSource,
    locks: CollectionLocks,
    serialize_writes: bool,
}

impl<B: KvBackend> Actions<B> {
    /// Actions with wall-clock time, no latency and serialized writes.
    pub fn new(persistence: Persistence<B>, store: Arc<StateStore>) -> Self {
        Self {
            persistence,
            store,
            latency: Latency::NONE,
            clock: Arc::new(SystemClock),
            ids: IdSource::new(),
            locks: CollectionLocks::default(),
            serialize_writes: true,
        }
    }

    /// Actions configured from latency and concurrency settings.
    pub fn from_config(persistence: Persistence<B>, store: Arc<StateStore>, config: &Config) -> Self {
        Self::new(persistence, store)
            .with_latency(Latency::new(config.latency.duration()))
            .with_serialized_writes(config.concurrency.serialize_writes)
    }

    #[must_use]
    pub const fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_serialized_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }

    pub const fn persistence(&self) -> &Persistence<B> {
        &self.persistence
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Take a collection lock when write serialization is on.
    async fn exclusive<'a>(&self, lock: &'a Mutex<()>) -> Option<MutexGuard<'a, ()>> {
        if self.serialize_writes {
            Some(lock.lock().await)
        } else {
            None
        }
    }

    /// Run `work` between a start transition and a success/failure one.
    async fn perform<T, Fut>(
        &self,
        action: &'static str,
        start: impl Into<Transition>,
        work: Fut,
        success: impl FnOnce(&T) -> Transition,
        failure: impl FnOnce(String) -> Transition,
    ) -> ActionResult<T>
    where
        Fut: Future<Output = ActionResult<T>>,
    {
        async {
            self.store.dispatch(start);
            self.latency.wait().await;
            match work.await {
                Ok(value) => {
                    self.store.dispatch(success(&value));
                    debug!("completed");
                    Ok(value)
                }
                Err(e) => self.fail(e, failure),
            }
        }
        .instrument(info_span!("action", action))
        .await
    }

    /// Record a failure without a preceding start transition.
    fn fail<T>(&self, e: ActionError, failure: impl FnOnce(String) -> Transition) -> ActionResult<T> {
        warn!(kind = %e.kind, error = %e.message, "failed");
        self.store.dispatch(failure(e.message.clone()));
        Err(e)
    }
}
