//! In-process key-value backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{KvBackend, StorageError};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl Inner {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

/// Map-backed store shared between clones.
///
/// An optional byte quota (keys plus values) mimics the size limit of
/// browser storage: a write that would exceed it fails and leaves the
/// previous value in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        let kv = Self::default();
        kv.lock().quota = Some(bytes);
        kv
    }

    /// Store a raw string, bypassing serialization and quota.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    /// Raw stored string, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Change the quota on a live store (tests use this to fail writes
    /// after seeding).
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.lock().quota = bytes;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvBackend for MemoryKv {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if let Some(quota) = inner.quota {
            let current = inner.entries.get(key).map_or(0, |v| key.len() + v.len());
            let others = inner.used_bytes() - current;
            let needed = key.len() + value.len();
            if others + needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available: quota.saturating_sub(others),
                });
            }
        }
        inner.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let a = MemoryKv::new();
        let b = a.clone();
        a.write("k", "v".into()).await.unwrap();
        assert_eq!(b.read("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn overwrite_counts_only_new_value_against_quota() {
        let kv = MemoryKv::with_quota(10);
        kv.write("k", "12345".into()).await.unwrap();
        // Replacing the 5-byte value with 9 bytes fits (1 + 9 = 10).
        kv.write("k", "123456789".into()).await.unwrap();
        let err = kv.write("k", "1234567890".into()).await.unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                key: "k".into(),
                needed: 11,
                available: 10,
            }
        );
        assert_eq!(kv.raw("k").as_deref(), Some("123456789"));
    }
}
