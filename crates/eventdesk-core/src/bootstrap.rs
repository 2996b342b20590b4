//! Cold-start sequence: seed empty collections, then rebuild the session
//! from a persisted token if the user record is missing.

use serde::Serialize;
use tracing::{info, warn};

use crate::actions::{ActionResult, Actions};
use crate::fixtures;
use crate::kv::KvBackend;
use crate::models::{Credentials, Session, User};
use crate::state::AuthAction;

/// How the session was (or was not) rebuilt at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Restoration {
    /// No token, or the user was already present.
    NotNeeded,
    /// The persisted user record was reattached to the token.
    FromStorage(User),
    /// A fixture login was replayed based on the token.
    ByLogin(User),
    /// The replayed login failed; the token is kept as is.
    Failed(String),
}

/// What the bootstrapper did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootReport {
    pub seeded: Vec<&'static str>,
    pub restored: Restoration,
}

pub struct Bootstrapper<'a, B> {
    actions: &'a Actions<B>,
}

impl<'a, B: KvBackend> Bootstrapper<'a, B> {
    pub const fn new(actions: &'a Actions<B>) -> Self {
        Self { actions }
    }

    pub async fn run(&self) -> ActionResult<BootReport> {
        let seeded = self.actions.persistence().seed_if_empty().await?;
        let restored = self.restore_session().await;
        info!(seeded = seeded.len(), restored = ?restored, "Bootstrap complete");
        Ok(BootReport { seeded, restored })
    }

    async fn restore_session(&self) -> Restoration {
        let store = self.actions.store();
        let Some(token) = store.read(|s| s.auth.token.clone().filter(|_| s.auth.needs_restoration())) else {
            return Restoration::NotNeeded;
        };

        if let Some(user) = self.actions.persistence().auth_user().await {
            store.dispatch(AuthAction::LoggedIn(Session {
                user: user.clone(),
                token,
            }));
            return Restoration::FromStorage(user);
        }

        let email = if token.contains("admin") {
            fixtures::ADMIN_EMAIL
        } else {
            fixtures::ATTENDEE_EMAIL
        };
        match self
            .actions
            .login(Credentials::new(email, fixtures::FIXTURE_PASSWORD))
            .await
        {
            Ok(session) => Restoration::ByLogin(session.user),
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                Restoration::Failed(e.message)
            }
        }
    }
}
