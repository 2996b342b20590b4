//! Key-value store adapter.
//!
//! A [`KvBackend`] stores raw strings under string keys. [`KvStore`] layers
//! JSON (de)serialization on top and offers two read/write styles:
//!
//! - `try_get` / `try_set` return a [`StorageError`] and let the caller decide;
//! - `get_or` / `set` apply the lenient policy: missing or corrupt values fall
//!   back to the supplied default, failed writes are logged and dropped.

mod memory;
mod sqlite;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

/// Errors raised by the key-value layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend itself failed (I/O, SQL, ...).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The stored value is not valid JSON for the requested type.
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// The write would exceed the backend's capacity.
    #[error("quota exceeded writing '{key}': need {needed} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    /// The value could not be serialized.
    #[error("failed to serialize value for '{key}': {reason}")]
    Serialize { key: String, reason: String },
}

/// Raw string storage. Implementations must be cheap to clone and share one
/// underlying store between clones.
pub trait KvBackend: Clone + Send + Sync + 'static {
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn write(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Typed JSON view over a [`KvBackend`].
#[derive(Debug, Clone)]
pub struct KvStore<B> {
    backend: B,
}

impl<B: KvBackend> KvStore<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and parse the value under `key`. `Ok(None)` when absent.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.read(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Read the value under `key`, falling back to `default` when it is
    /// missing or unreadable. Never fails.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "Falling back to default value");
                default
            }
        }
    }

    /// Serialize and store `value` under `key`.
    pub async fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.backend.write(key, raw).await
    }

    /// Store `value` under `key`, logging and dropping any failure.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value).await {
            warn!(key, error = %e, "Dropping failed write");
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key).await
    }
}
