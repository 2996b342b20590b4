use tracing::{info, warn};

use super::{ActionError, ActionResult, Actions, messages};
use crate::fixtures;
use crate::kv::KvBackend;
use crate::models::{Credentials, NewUser, Role, Session, User};
use crate::state::{AuthAction, AuthOp, Transition};

/// Prefix of every issued mock token.
pub const TOKEN_PREFIX: &str = "mock-jwt-token-for-";

fn failed(op: AuthOp) -> impl FnOnce(String) -> Transition {
    move |message| AuthAction::Failed(op, message).into()
}

impl<B: KvBackend> Actions<B> {
    /// Check credentials against the fixture identities and open a session.
    ///
    /// Users created through [`Actions::register`] cannot log in this way.
    pub async fn login(&self, credentials: Credentials) -> ActionResult<Session> {
        self.perform(
            "login",
            AuthAction::Started(AuthOp::Login),
            async move {
                let (user, token) = fixtures::authenticate(&credentials.email, &credentials.password)
                    .ok_or_else(|| ActionError::auth_required(messages::INVALID_CREDENTIALS))?;
                self.persistence.store_auth(token, &user).await?;
                info!(user = %user.id, role = %user.role, "Logged in");
                Ok(Session {
                    user,
                    token: token.to_string(),
                })
            },
            |session| AuthAction::LoggedIn(session.clone()).into(),
            failed(AuthOp::Login),
        )
        .await
    }

    /// Create an attendee account and open a session for it.
    ///
    /// Nothing is validated and duplicate emails are accepted. If the auth
    /// mirror cannot be written the new user is removed again.
    pub async fn register(&self, new_user: NewUser) -> ActionResult<Session> {
        self.perform(
            "register",
            AuthAction::Started(AuthOp::Register),
            async move {
                let _guard = self.exclusive(&self.locks.users).await;
                let user = User {
                    id: self.ids.next_id(self.clock.now()),
                    name: new_user.name,
                    email: new_user.email,
                    role: Role::Attendee,
                };
                let previous = self.persistence.users().await;
                let mut users = previous.clone();
                users.push(user.clone());
                self.persistence.store_users(&users).await?;

                let token = format!("{TOKEN_PREFIX}{}", user.id);
                if let Err(e) = self.persistence.store_auth(&token, &user).await {
                    self.undo_register(&previous).await;
                    return Err(e.into());
                }
                info!(user = %user.id, "Registered new user");
                Ok(Session { user, token })
            },
            |session| AuthAction::Registered(session.clone()).into(),
            failed(AuthOp::Register),
        )
        .await
    }

    /// Put the user list and auth mirror back after a failed sign-up so no
    /// half-written account survives.
    async fn undo_register(&self, previous: &[User]) {
        if let Err(e) = self.persistence.store_users(previous).await {
            warn!(error = %e, "Could not roll back user list");
        }
        if let Err(e) = self.persistence.clear_auth().await {
            warn!(error = %e, "Could not clear partial auth mirror");
        }
    }

    /// End the session. The slice is cleared immediately; clearing the
    /// persisted mirror follows.
    pub async fn logout(&self) -> ActionResult<()> {
        self.store.dispatch(AuthAction::LoggedOut);
        self.persistence.clear_auth().await?;
        info!("Logged out");
        Ok(())
    }
}
