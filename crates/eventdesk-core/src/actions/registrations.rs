use tracing::info;

use super::{ActionError, ActionResult, Actions, messages};
use crate::kv::KvBackend;
use crate::models::{Id, Registration, RegistrationStatus};
use crate::state::{RegistrationsAction, RegistrationsOp, Transition};

fn failed(op: RegistrationsOp) -> impl FnOnce(String) -> Transition {
    move |message| RegistrationsAction::Failed(op, message).into()
}

fn present(id: Option<Id>) -> Option<Id> {
    id.filter(|id| !id.as_str().is_empty())
}

impl<B: KvBackend> Actions<B> {
    /// Registrations belonging to one user.
    pub async fn fetch_registrations(&self, user_id: impl Into<Id>) -> ActionResult<Vec<Registration>> {
        let user_id = user_id.into();
        self.perform(
            "fetch_registrations",
            RegistrationsAction::Started(RegistrationsOp::Fetch),
            async move {
                let mut registrations = self.persistence.registrations().await;
                registrations.retain(|r| r.user_id == user_id);
                Ok(registrations)
            },
            |found| RegistrationsAction::Fetched(found.clone()).into(),
            failed(RegistrationsOp::Fetch),
        )
        .await
    }

    /// Registrations for one event, whatever user made them.
    pub async fn fetch_event_registrations(&self, event_id: impl Into<Id>) -> ActionResult<Vec<Registration>> {
        let event_id = event_id.into();
        self.perform(
            "fetch_event_registrations",
            RegistrationsAction::Started(RegistrationsOp::Fetch),
            async move {
                let mut registrations = self.persistence.registrations().await;
                registrations.retain(|r| r.event_id == event_id);
                Ok(registrations)
            },
            |found| RegistrationsAction::Fetched(found.clone()).into(),
            failed(RegistrationsOp::Fetch),
        )
        .await
    }

    /// Register a user for an event.
    ///
    /// Missing ids are rejected before the start transition. A pair that is
    /// already registered is a conflict. The event's existence and capacity
    /// are not checked.
    pub async fn register_for_event(
        &self,
        event_id: Option<Id>,
        user_id: Option<Id>,
    ) -> ActionResult<Registration> {
        let Some(event_id) = present(event_id) else {
            return self.fail(
                ActionError::validation(messages::MISSING_EVENT_ID),
                failed(RegistrationsOp::Register),
            );
        };
        let Some(user_id) = present(user_id) else {
            return self.fail(
                ActionError::auth_required(messages::LOGIN_REQUIRED),
                failed(RegistrationsOp::Register),
            );
        };

        self.perform(
            "register_for_event",
            RegistrationsAction::Started(RegistrationsOp::Register),
            async move {
                let _guard = self.exclusive(&self.locks.registrations).await;
                let mut registrations = self.persistence.registrations().await;
                if registrations.iter().any(|r| r.matches(&event_id, &user_id)) {
                    return Err(ActionError::conflict(messages::ALREADY_REGISTERED));
                }

                let now = self.clock.now();
                let registration = Registration {
                    id: self.ids.next_id(now),
                    event_id,
                    user_id,
                    registration_date: now,
                    status: RegistrationStatus::Confirmed,
                    checked_in: false,
                };
                registrations.push(registration.clone());
                self.persistence.store_registrations(&registrations).await?;
                info!(
                    id = %registration.id,
                    event = %registration.event_id,
                    user = %registration.user_id,
                    "Registered for event"
                );
                Ok(registration)
            },
            |registration| RegistrationsAction::Registered(registration.clone()).into(),
            failed(RegistrationsOp::Register),
        )
        .await
    }

    /// Remove a registration. Unknown ids succeed and change nothing.
    pub async fn cancel_registration(&self, id: impl Into<Id>) -> ActionResult<Id> {
        let id = id.into();
        self.perform(
            "cancel_registration",
            RegistrationsAction::Started(RegistrationsOp::Cancel),
            async move {
                let _guard = self.exclusive(&self.locks.registrations).await;
                let mut registrations = self.persistence.registrations().await;
                let before = registrations.len();
                registrations.retain(|r| r.id != id);
                self.persistence.store_registrations(&registrations).await?;
                info!(id = %id, removed = before - registrations.len(), "Registration cancelled");
                Ok(id)
            },
            |id| RegistrationsAction::Cancelled(id.clone()).into(),
            failed(RegistrationsOp::Cancel),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::*;
    use crate::actions::testing::{self, start};
    use crate::config::WriteFailurePolicy;
    use crate::error::ErrorKind;
    use crate::fixtures;
    use crate::kv::{SqliteKv, StorageError};
    use crate::persistence::StorageKeys;

    fn some(id: &str) -> Option<Id> {
        Some(Id::from(id))
    }

    #[tokio::test]
    async fn fetch_filters_by_user_and_event() {
        let (actions, _) = testing::actions();
        let mine = actions.fetch_registrations("2").await.unwrap();
        assert_eq!(mine, fixtures::registrations());
        assert!(actions.fetch_registrations("1").await.unwrap().is_empty());

        let for_event = actions.fetch_event_registrations("2").await.unwrap();
        assert_eq!(for_event.len(), 1);
        assert_eq!(actions.store().snapshot().registrations.registrations, for_event);
    }

    #[tokio::test]
    async fn register_creates_confirmed_registration() {
        let (actions, _) = testing::actions();
        let reg = actions
            .register_for_event(some("3"), some("2"))
            .await
            .unwrap();

        assert_eq!(reg.status, RegistrationStatus::Confirmed);
        assert!(!reg.checked_in);
        assert_eq!(reg.registration_date, start());
        assert!(actions.persistence().registrations().await.contains(&reg));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let (actions, _) = testing::actions();
        actions.register_for_event(some("3"), some("2")).await.unwrap();

        let err = actions
            .register_for_event(some("3"), some("2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, "You are already registered for this event");
        assert_eq!(
            actions.store().snapshot().registrations.error.as_deref(),
            Some("You are already registered for this event")
        );
    }

    #[tokio::test]
    async fn numeric_and_string_ids_are_the_same_pair() {
        let (actions, _) = testing::actions();
        // Fixture registration "1" is user 2 on event 1.
        let err = actions
            .register_for_event(Some(Id::from(1_u64)), Some(Id::from(2_i64)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn missing_ids_fail_without_start() {
        let (actions, _) = testing::actions();
        let mut rx = actions.store().subscribe();

        let err = actions.register_for_event(None, some("2")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Missing event id");

        let err = actions
            .register_for_event(some("1"), Some(Id::from("")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthRequired);
        assert_eq!(err.message, "You must be logged in to register for an event");

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().registrations.clone();
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("You must be logged in to register for an event")
        );
        assert_eq!(
            actions.persistence().registrations().await,
            fixtures::registrations()
        );
    }

    /// Holds every read of `key` until `parties` readers have arrived, so
    /// concurrent read-check-write sequences overlap deterministically.
    #[derive(Clone)]
    struct RendezvousKv {
        inner: SqliteKv,
        key: &'static str,
        barrier: Arc<Barrier>,
    }

    impl KvBackend for RendezvousKv {
        async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            let value = self.inner.read(key).await?;
            if key == self.key {
                self.barrier.wait().await;
            }
            Ok(value)
        }

        async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.inner.write(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    async fn race_twice<B: KvBackend>(actions: Actions<B>) -> usize {
        let actions = Arc::new(actions);
        let attempt = || {
            let actions = Arc::clone(&actions);
            tokio::spawn(async move { actions.register_for_event(some("4"), some("1")).await })
        };
        let (a, b) = (attempt(), attempt());
        [a.await.unwrap(), b.await.unwrap()]
            .iter()
            .filter(|r| r.is_ok())
            .count()
    }

    async fn stored_pairs(kv: &SqliteKv) -> usize {
        let raw = kv.read(StorageKeys::REGISTRATIONS).await.unwrap().unwrap();
        let stored: Vec<Registration> = serde_json::from_str(&raw).unwrap();
        stored
            .iter()
            .filter(|r| r.matches(&Id::from("4"), &Id::from("1")))
            .count()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_yield_one_success() {
        let kv = SqliteKv::open_in_memory().await.unwrap();
        let actions = testing::actions_on(kv.clone(), WriteFailurePolicy::Log);

        assert_eq!(race_twice(actions).await, 1);
        assert_eq!(stored_pairs(&kv).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unserialized_writes_let_duplicates_through() {
        let kv = SqliteKv::open_in_memory().await.unwrap();
        let racing = RendezvousKv {
            inner: kv.clone(),
            key: StorageKeys::REGISTRATIONS,
            barrier: Arc::new(Barrier::new(2)),
        };
        let actions =
            testing::actions_on(racing, WriteFailurePolicy::Log).with_serialized_writes(false);

        // Both attempts read before either writes, so both see no duplicate.
        assert_eq!(race_twice(actions).await, 2);
        // Last write wins, so one of the two acknowledged registrations is lost.
        assert_eq!(stored_pairs(&kv).await, 1);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let (actions, _) = testing::actions();
        actions.fetch_registrations("2").await.unwrap();

        assert_eq!(actions.cancel_registration("1").await.unwrap(), Id::from("1"));
        assert_eq!(actions.cancel_registration("1").await.unwrap(), Id::from("1"));

        let stored = actions.persistence().registrations().await;
        assert_eq!(stored.len(), 1);
        let slice = actions.store().snapshot().registrations;
        assert!(slice.registrations.iter().all(|r| r.id != Id::from("1")));
        assert!(!slice.loading);
    }

    #[test]
    fn failure_transition_names_its_operation() {
        let t = failed(RegistrationsOp::Register)("boom".into());
        assert_eq!(t.name(), "registrations/registerForEventFailure");
    }
}
