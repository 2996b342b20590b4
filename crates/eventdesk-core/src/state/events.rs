//! Events slice: a cached copy of the Events collection, refreshed only by
//! explicit fetches.

use serde::Serialize;

use crate::models::{Event, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsOp {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
}

impl EventsOp {
    const fn prefix(self) -> &'static str {
        match self {
            Self::FetchAll => "events/fetchEvents",
            Self::FetchOne => "events/fetchEvent",
            Self::Create => "events/createEvent",
            Self::Update => "events/updateEvent",
            Self::Delete => "events/deleteEvent",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventsAction {
    Started(EventsOp),
    Failed(EventsOp, String),
    FetchedAll(Vec<Event>),
    FetchedOne(Event),
    Created(Event),
    Updated(Event),
    Deleted(Id),
}

impl EventsAction {
    pub fn name(&self) -> String {
        match self {
            Self::Started(op) => format!("{}Start", op.prefix()),
            Self::Failed(op, _) => format!("{}Failure", op.prefix()),
            Self::FetchedAll(_) => format!("{}Success", EventsOp::FetchAll.prefix()),
            Self::FetchedOne(_) => format!("{}Success", EventsOp::FetchOne.prefix()),
            Self::Created(_) => format!("{}Success", EventsOp::Create.prefix()),
            Self::Updated(_) => format!("{}Success", EventsOp::Update.prefix()),
            Self::Deleted(_) => format!("{}Success", EventsOp::Delete.prefix()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventsState {
    pub events: Vec<Event>,
    pub event: Option<Event>,
    pub loading: bool,
    pub error: Option<String>,
}

impl EventsState {
    pub fn find(&self, id: &Id) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    #[must_use]
    pub fn reduce(mut self, action: &EventsAction) -> Self {
        match action {
            EventsAction::Started(_) => {
                self.loading = true;
                self.error = None;
                return self;
            }
            EventsAction::Failed(_, message) => {
                self.error = Some(message.clone());
            }
            EventsAction::FetchedAll(events) => {
                self.events.clone_from(events);
            }
            EventsAction::FetchedOne(event) => {
                self.event = Some(event.clone());
            }
            EventsAction::Created(event) => {
                self.events.push(event.clone());
            }
            EventsAction::Updated(event) => {
                for existing in &mut self.events {
                    if existing.id == event.id {
                        existing.clone_from(event);
                    }
                }
                self.event = Some(event.clone());
            }
            EventsAction::Deleted(id) => {
                self.events.retain(|e| &e.id != id);
            }
        }
        self.loading = false;
        self
    }
}
