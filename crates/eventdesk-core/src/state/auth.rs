//! Auth slice.

use serde::Serialize;

use crate::models::{Session, User};

/// Which auth operation a start/failure transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Started(AuthOp),
    Failed(AuthOp, String),
    LoggedIn(Session),
    Registered(Session),
    LoggedOut,
}

impl AuthAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started(AuthOp::Login) => "auth/loginStart",
            Self::Started(AuthOp::Register) => "auth/registerStart",
            Self::Failed(AuthOp::Login, _) => "auth/loginFailure",
            Self::Failed(AuthOp::Register, _) => "auth/registerFailure",
            Self::LoggedIn(_) => "auth/loginSuccess",
            Self::Registered(_) => "auth/registerSuccess",
            Self::LoggedOut => "auth/logout",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// State rebuilt from the persisted auth mirror.
    pub fn restored(token: Option<String>, user: Option<User>) -> Self {
        Self {
            is_authenticated: token.is_some(),
            // A user without a token is not a session.
            user: token.as_ref().and(user),
            token,
            loading: false,
            error: None,
        }
    }

    /// A token is present but the user record is not.
    pub const fn needs_restoration(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }

    #[must_use]
    pub fn reduce(mut self, action: &AuthAction) -> Self {
        match action {
            AuthAction::Started(_) => {
                self.loading = true;
                self.error = None;
            }
            AuthAction::Failed(_, message) => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            AuthAction::LoggedIn(session) | AuthAction::Registered(session) => {
                self.loading = false;
                self.user = Some(session.user.clone());
                self.token = Some(session.token.clone());
                self.is_authenticated = true;
            }
            AuthAction::LoggedOut => {
                self.user = None;
                self.token = None;
                self.is_authenticated = false;
                self.error = None;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn session() -> Session {
        Session {
            user: fixtures::admin(),
            token: fixtures::ADMIN_TOKEN.into(),
        }
    }

    #[test]
    fn login_cycle() {
        let state = AuthState::default().reduce(&AuthAction::Started(AuthOp::Login));
        assert!(state.loading);

        let state = state.reduce(&AuthAction::LoggedIn(session()));
        assert!(!state.loading);
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(fixtures::admin()));
    }

    #[test]
    fn failure_keeps_session_flags() {
        let state = AuthState::default()
            .reduce(&AuthAction::Started(AuthOp::Login))
            .reduce(&AuthAction::Failed(AuthOp::Login, "Invalid email or password".into()));
        assert!(!state.loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.error.as_deref(), Some("Invalid email or password"));
    }

    #[test]
    fn start_clears_previous_error() {
        let state = AuthState {
            error: Some("old".into()),
            ..AuthState::default()
        }
        .reduce(&AuthAction::Started(AuthOp::Register));
        assert_eq!(state.error, None);
    }

    #[test]
    fn logout_clears_everything() {
        let state = AuthState::default()
            .reduce(&AuthAction::Registered(session()))
            .reduce(&AuthAction::LoggedOut);
        assert_eq!(state, AuthState::default());
    }

    #[test]
    fn restored_token_without_user_needs_restoration() {
        let state = AuthState::restored(Some("mock-jwt-token-for-admin".into()), None);
        assert!(state.is_authenticated);
        assert!(state.needs_restoration());

        let orphan = AuthState::restored(None, Some(fixtures::attendee()));
        assert_eq!(orphan.user, None);
        assert!(!orphan.is_authenticated);
    }
}
