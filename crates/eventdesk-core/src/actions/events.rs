use tracing::info;

use super::{ActionError, ActionResult, Actions, messages};
use crate::kv::KvBackend;
use crate::models::{Event, EventDraft, EventPatch, Id};
use crate::state::{EventsAction, EventsOp, Transition};

fn failed(op: EventsOp) -> impl FnOnce(String) -> Transition {
    move |message| EventsAction::Failed(op, message).into()
}

impl<B: KvBackend> Actions<B> {
    /// Load every event into the events slice.
    pub async fn fetch_events(&self) -> ActionResult<Vec<Event>> {
        self.perform(
            "fetch_events",
            EventsAction::Started(EventsOp::FetchAll),
            async move { Ok(self.persistence.events().await) },
            |events| EventsAction::FetchedAll(events.clone()).into(),
            failed(EventsOp::FetchAll),
        )
        .await
    }

    pub async fn fetch_event(&self, id: impl Into<Id>) -> ActionResult<Event> {
        let id = id.into();
        self.perform(
            "fetch_event",
            EventsAction::Started(EventsOp::FetchOne),
            async move {
                self.persistence
                    .events()
                    .await
                    .into_iter()
                    .find(|e| e.id == id)
                    .ok_or_else(|| ActionError::not_found(messages::EVENT_NOT_FOUND))
            },
            |event| EventsAction::FetchedOne(event.clone()).into(),
            failed(EventsOp::FetchOne),
        )
        .await
    }

    /// Append a new published event. The draft is stored as given; form
    /// checks belong to [`EventDraft::validate`].
    pub async fn create_event(&self, draft: EventDraft) -> ActionResult<Event> {
        self.perform(
            "create_event",
            EventsAction::Started(EventsOp::Create),
            async move {
                let _guard = self.exclusive(&self.locks.events).await;
                let mut events = self.persistence.events().await;
                let now = self.clock.now();
                let event = Event::from_draft(self.ids.next_id(now), draft, now);
                events.push(event.clone());
                self.persistence.store_events(&events).await?;
                info!(id = %event.id, title = %event.title, "Event created");
                Ok(event)
            },
            |event| EventsAction::Created(event.clone()).into(),
            failed(EventsOp::Create),
        )
        .await
    }

    pub async fn update_event(&self, id: impl Into<Id>, patch: EventPatch) -> ActionResult<Event> {
        let id = id.into();
        self.perform(
            "update_event",
            EventsAction::Started(EventsOp::Update),
            async move {
                let _guard = self.exclusive(&self.locks.events).await;
                let mut events = self.persistence.events().await;
                let Some(slot) = events.iter_mut().find(|e| e.id == id) else {
                    return Err(ActionError::not_found(messages::EVENT_NOT_FOUND));
                };
                let updated = slot.clone().merged(patch, self.clock.now());
                slot.clone_from(&updated);
                self.persistence.store_events(&events).await?;
                info!(id = %updated.id, "Event updated");
                Ok(updated)
            },
            |event| EventsAction::Updated(event.clone()).into(),
            failed(EventsOp::Update),
        )
        .await
    }

    /// Remove an event. Deleting an unknown id succeeds and changes nothing.
    ///
    /// Registrations pointing at the event are left in place.
    pub async fn delete_event(&self, id: impl Into<Id>) -> ActionResult<Id> {
        let id = id.into();
        self.perform(
            "delete_event",
            EventsAction::Started(EventsOp::Delete),
            async move {
                let _guard = self.exclusive(&self.locks.events).await;
                let mut events = self.persistence.events().await;
                let before = events.len();
                events.retain(|e| e.id != id);
                self.persistence.store_events(&events).await?;
                info!(id = %id, removed = before - events.len(), "Event deleted");
                Ok(id)
            },
            |id| EventsAction::Deleted(id.clone()).into(),
            failed(EventsOp::Delete),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use serde_json::{Map, json};

    use super::*;
    use crate::actions::testing::{self, start};
    use crate::config::WriteFailurePolicy;
    use crate::error::ErrorKind;
    use crate::fixtures;
    use crate::persistence::StorageKeys;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            description: "An evening of talks".into(),
            location: "Berlin".into(),
            start_date: start() + TimeDelta::days(10),
            end_date: start() + TimeDelta::days(10) + TimeDelta::hours(3),
            max_attendees: Some(30),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn fetch_events_fills_slice() {
        let (actions, _) = testing::actions();
        let events = actions.fetch_events().await.unwrap();
        assert_eq!(events, fixtures::events());

        let state = actions.store().snapshot().events;
        assert_eq!(state.events, events);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn fetch_unknown_event_fails_with_message() {
        let (actions, _) = testing::actions();
        let err = actions.fetch_event("999").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Event not found");

        let state = actions.store().snapshot().events;
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Event not found"));
    }

    #[tokio::test]
    async fn fetch_event_sets_current() {
        let (actions, _) = testing::actions();
        let event = actions.fetch_event(2_u64).await.unwrap();
        assert_eq!(event.id, Id::from("2"));
        assert_eq!(actions.store().snapshot().events.event, Some(event));
    }

    #[tokio::test]
    async fn created_events_get_distinct_ids_and_persist() {
        let (actions, _) = testing::actions();
        let a = actions.create_event(draft("A")).await.unwrap();
        let b = actions.create_event(draft("B")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(a.is_published);
        assert_eq!(a.created_at, start());
        assert_eq!(a.created_at, a.updated_at);

        let stored = actions.persistence().events().await;
        assert_eq!(stored.len(), fixtures::events().len() + 2);
        assert!(stored.contains(&a) && stored.contains(&b));
        assert_eq!(actions.store().snapshot().events.events, vec![a, b]);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_identity() {
        let (actions, _) = testing::actions();
        let original = fixtures::events().remove(0);
        let updated = actions
            .update_event(original.id.clone(), EventPatch::title("Renamed"))
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.location, original.location);
        assert_eq!(updated.updated_at, start());
        assert_eq!(actions.persistence().events().await[0], updated);
        assert_eq!(actions.store().snapshot().events.event, Some(updated));
    }

    #[tokio::test]
    async fn shadowing_extra_keys_do_not_corrupt_the_collection() {
        let (actions, _) = testing::actions();
        let draft: EventDraft = serde_json::from_value(json!({
            "title": "Hidden",
            "description": "Draft with a stray flag",
            "location": "Berlin",
            "startDate": "2025-06-01T18:00:00Z",
            "endDate": "2025-06-01T21:00:00Z",
            "isPublished": false
        }))
        .unwrap();
        let created = actions.create_event(draft).await.unwrap();
        assert!(actions.fetch_events().await.unwrap().contains(&created));

        let mut patch = EventPatch::title("Renamed");
        patch.extra.insert("id".into(), json!("zzz"));
        let renamed = actions.update_event("1", patch).await.unwrap();
        assert_eq!(renamed.id, Id::from("1"));

        let events = actions.fetch_events().await.unwrap();
        assert_eq!(events.len(), fixtures::events().len() + 1);
        assert!(events.contains(&created) && events.contains(&renamed));
    }

    #[tokio::test]
    async fn update_unknown_event_writes_nothing() {
        let (actions, kv) = testing::actions();
        let err = actions
            .update_event("999", EventPatch::title("X"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Event not found");
        assert_eq!(kv.raw(StorageKeys::EVENTS), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (actions, _) = testing::actions();
        assert_eq!(actions.delete_event("3").await.unwrap(), Id::from("3"));
        assert_eq!(actions.delete_event("3").await.unwrap(), Id::from("3"));

        let stored = actions.persistence().events().await;
        assert_eq!(stored.len(), fixtures::events().len() - 1);
        assert!(stored.iter().all(|e| e.id != Id::from("3")));
    }

    #[tokio::test]
    async fn delete_leaves_registrations_dangling() {
        let (actions, _) = testing::actions();
        actions.delete_event("1").await.unwrap();
        let regs = actions.fetch_event_registrations("1").await.unwrap();
        assert_eq!(regs.len(), 1);
    }

    #[tokio::test]
    async fn strict_policy_surfaces_storage_failure() {
        let (actions, kv) = testing::actions_with(WriteFailurePolicy::Surface);
        kv.set_quota(Some(16));

        let err = actions.create_event(draft("Too big")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageDegraded);
        let state = actions.store().snapshot().events;
        assert!(!state.loading);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn lenient_policy_keeps_in_memory_result() {
        let (actions, kv) = testing::actions();
        kv.set_quota(Some(16));

        let event = actions.create_event(draft("Unsaved")).await.unwrap();
        assert_eq!(actions.store().snapshot().events.events, vec![event]);
        assert_eq!(kv.raw(StorageKeys::EVENTS), None);
    }
}
