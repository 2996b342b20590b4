//! In-memory application state.
//!
//! Four independent slices, each updated by a pure reducer. A [`Transition`]
//! targets exactly one slice; [`AppState::reduce`] never lets one slice's
//! transition touch another. [`StateStore`] owns the current state and
//! notifies subscribers after every dispatch.

mod auth;
mod events;
mod navigation;
mod registrations;
pub mod selectors;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

pub use auth::{AuthAction, AuthOp, AuthState};
pub use events::{EventsAction, EventsOp, EventsState};
pub use navigation::{NavigationAction, NavigationState};
pub use registrations::{RegistrationsAction, RegistrationsOp, RegistrationsState};

use crate::kv::{KvBackend, StorageError};
use crate::persistence::Persistence;

/// A state change addressed to one slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Auth(AuthAction),
    Events(EventsAction),
    Registrations(RegistrationsAction),
    Navigation(NavigationAction),
}

impl Transition {
    pub fn name(&self) -> String {
        match self {
            Self::Auth(a) => a.name().to_owned(),
            Self::Events(a) => a.name(),
            Self::Registrations(a) => a.name(),
            Self::Navigation(a) => a.name().to_owned(),
        }
    }
}

impl From<AuthAction> for Transition {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<EventsAction> for Transition {
    fn from(action: EventsAction) -> Self {
        Self::Events(action)
    }
}

impl From<RegistrationsAction> for Transition {
    fn from(action: RegistrationsAction) -> Self {
        Self::Registrations(action)
    }
}

impl From<NavigationAction> for Transition {
    fn from(action: NavigationAction) -> Self {
        Self::Navigation(action)
    }
}

/// The whole application state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub auth: AuthState,
    pub events: EventsState,
    pub registrations: RegistrationsState,
    pub navigation: NavigationState,
}

impl AppState {
    #[must_use]
    pub fn reduce(mut self, transition: &Transition) -> Self {
        match transition {
            Transition::Auth(a) => self.auth = self.auth.reduce(a),
            Transition::Events(a) => self.events = self.events.reduce(a),
            Transition::Registrations(a) => self.registrations = self.registrations.reduce(a),
            Transition::Navigation(a) => self.navigation = self.navigation.reduce(a),
        }
        self
    }
}

/// Owner of the live [`AppState`].
///
/// Construct one per application (or per test); nothing here is global.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<AppState>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Build the initial state from persisted navigation and auth data.
    pub async fn init<B: KvBackend>(persistence: &Persistence<B>) -> Self {
        let current_path = persistence.current_path().await;
        let token = persistence.auth_token().await;
        let user = persistence.auth_user().await;

        info!(
            path = %current_path,
            has_token = token.is_some(),
            has_user = user.is_some(),
            "State store initialised"
        );

        Self::new(AppState {
            auth: AuthState::restored(token, None),
            navigation: NavigationState::at(current_path),
            ..AppState::default()
        })
    }

    /// Apply a transition and notify subscribers.
    pub fn dispatch(&self, transition: impl Into<Transition>) {
        let transition = transition.into();
        debug!(transition = %transition.name(), "dispatch");
        self.tx.send_modify(|state| {
            let current = std::mem::take(state);
            *state = current.reduce(&transition);
        });
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read part of the current state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver that observes every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Flush navigation and the auth mirror back to persistence.
    pub async fn teardown<B: KvBackend>(&self, persistence: &Persistence<B>) -> Result<(), StorageError> {
        let (path, token, user) = self.read(|s| {
            (
                s.navigation.current_path.clone(),
                s.auth.token.clone(),
                s.auth.user.clone(),
            )
        });

        persistence.store_current_path(&path).await?;
        match (token, user) {
            (Some(token), Some(user)) => persistence.store_auth(&token, &user).await?,
            (None, _) => persistence.clear_auth().await?,
            // Token without user: leave the mirror for the next boot to restore.
            (Some(_), None) => {}
        }
        debug!(path = %path, "State store flushed");
        Ok(())
    }
}
