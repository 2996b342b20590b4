//! Typed accessors over the key-value store.
//!
//! Each collection lives under a fixed key with a fixed default. This layer
//! performs no validation; it only decides key names, JSON shape, and what
//! happens when a write fails (see [`WriteFailurePolicy`]).

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::WriteFailurePolicy;
use crate::fixtures;
use crate::kv::{KvBackend, KvStore, StorageError};
use crate::models::{Event, Registration, User};

/// Storage keys owned by the persistence layer.
pub struct StorageKeys;

impl StorageKeys {
    pub const EVENTS: &'static str = "eventdesk_events";
    pub const REGISTRATIONS: &'static str = "eventdesk_registrations";
    pub const USERS: &'static str = "eventdesk_users";
    pub const NAVIGATION: &'static str = "eventdesk_navigation";
    pub const TOKEN: &'static str = "token";
    pub const USER: &'static str = "user";

    pub const ALL: [&'static str; 6] = [
        Self::EVENTS,
        Self::REGISTRATIONS,
        Self::USERS,
        Self::NAVIGATION,
        Self::TOKEN,
        Self::USER,
    ];
}

/// Root path used when nothing has been persisted.
pub const ROOT_PATH: &str = "/";

/// Persistence service for events, registrations, users, navigation and the
/// auth mirror.
#[derive(Debug, Clone)]
pub struct Persistence<B> {
    store: KvStore<B>,
    write_policy: WriteFailurePolicy,
}

impl<B: KvBackend> Persistence<B> {
    pub const fn new(backend: B, write_policy: WriteFailurePolicy) -> Self {
        Self {
            store: KvStore::new(backend),
            write_policy,
        }
    }

    pub const fn kv(&self) -> &KvStore<B> {
        &self.store
    }

    pub const fn write_policy(&self) -> WriteFailurePolicy {
        self.write_policy
    }

    async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        match self.store.try_set(key, value).await {
            Ok(()) => Ok(()),
            Err(e) if self.write_policy == WriteFailurePolicy::Log => {
                warn!(key, error = %e, "Write failed, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.store.remove(key).await {
            Ok(()) => Ok(()),
            Err(e) if self.write_policy == WriteFailurePolicy::Log => {
                warn!(key, error = %e, "Remove failed, continuing");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub async fn events(&self) -> Vec<Event> {
        self.store.get_or(StorageKeys::EVENTS, fixtures::events()).await
    }

    pub async fn store_events(&self, events: &[Event]) -> Result<(), StorageError> {
        self.put(StorageKeys::EVENTS, events).await
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.store
            .get_or(StorageKeys::REGISTRATIONS, fixtures::registrations())
            .await
    }

    pub async fn store_registrations(&self, registrations: &[Registration]) -> Result<(), StorageError> {
        self.put(StorageKeys::REGISTRATIONS, registrations).await
    }

    pub async fn users(&self) -> Vec<User> {
        self.store.get_or(StorageKeys::USERS, fixtures::users()).await
    }

    pub async fn store_users(&self, users: &[User]) -> Result<(), StorageError> {
        self.put(StorageKeys::USERS, users).await
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn current_path(&self) -> String {
        self.store
            .get_or(StorageKeys::NAVIGATION, ROOT_PATH.to_string())
            .await
    }

    pub async fn store_current_path(&self, path: &str) -> Result<(), StorageError> {
        self.put(StorageKeys::NAVIGATION, path).await
    }

    // =========================================================================
    // Auth mirror
    // =========================================================================

    pub async fn auth_token(&self) -> Option<String> {
        self.store.get_or(StorageKeys::TOKEN, None).await
    }

    pub async fn auth_user(&self) -> Option<User> {
        self.store.get_or(StorageKeys::USER, None).await
    }

    pub async fn store_auth_token(&self, token: &str) -> Result<(), StorageError> {
        self.put(StorageKeys::TOKEN, token).await
    }

    pub async fn store_auth_user(&self, user: &User) -> Result<(), StorageError> {
        self.put(StorageKeys::USER, user).await
    }

    /// Mirror a whole session.
    pub async fn store_auth(&self, token: &str, user: &User) -> Result<(), StorageError> {
        self.store_auth_token(token).await?;
        self.store_auth_user(user).await
    }

    pub async fn clear_auth(&self) -> Result<(), StorageError> {
        self.delete(StorageKeys::TOKEN).await?;
        self.delete(StorageKeys::USER).await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Remove every key this layer owns.
    pub async fn reset_all(&self) -> Result<(), StorageError> {
        for key in StorageKeys::ALL {
            self.delete(key).await?;
        }
        info!("All persisted data cleared");
        Ok(())
    }

    /// Write fixture data into every collection that is absent or empty.
    ///
    /// Returns the keys that were seeded. Corrupt collections are left as
    /// they are.
    pub async fn seed_if_empty(&self) -> Result<Vec<&'static str>, StorageError> {
        let mut seeded = Vec::new();
        if self.needs_seed::<Event>(StorageKeys::EVENTS).await {
            self.store_events(&fixtures::events()).await?;
            seeded.push(StorageKeys::EVENTS);
        }
        if self.needs_seed::<Registration>(StorageKeys::REGISTRATIONS).await {
            self.store_registrations(&fixtures::registrations()).await?;
            seeded.push(StorageKeys::REGISTRATIONS);
        }
        if self.needs_seed::<User>(StorageKeys::USERS).await {
            self.store_users(&fixtures::users()).await?;
            seeded.push(StorageKeys::USERS);
        }
        for key in &seeded {
            info!(key, "Seeded collection with fixture data");
        }
        Ok(seeded)
    }

    async fn needs_seed<T: DeserializeOwned>(&self, key: &str) -> bool {
        match self.store.try_get::<Vec<T>>(key).await {
            Ok(None) => true,
            Ok(Some(items)) => items.is_empty(),
            Err(e) => {
                warn!(key, error = %e, "Not seeding unreadable collection");
                false
            }
        }
    }
}
