//! Read-only views computed from slices and collections.

use serde::Serialize;

use super::AuthState;
use crate::models::{Registration, Role, User};

pub const UNKNOWN_NAME: &str = "Unknown user";
pub const UNKNOWN_EMAIL: &str = "Unknown email";

/// A registration joined with its user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(flatten)]
    pub registration: Registration,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
}

/// Join registrations with users, in registration order.
///
/// Registrations whose user is unknown still appear, with placeholder
/// name and email.
pub fn participants(registrations: &[Registration], users: &[User]) -> Vec<Participant> {
    registrations
        .iter()
        .map(|registration| {
            let user = users.iter().find(|u| u.id == registration.user_id);
            Participant {
                registration: registration.clone(),
                name: user.map_or_else(|| UNKNOWN_NAME.to_string(), |u| u.name.clone()),
                email: user.map_or_else(|| UNKNOWN_EMAIL.to_string(), |u| u.email.clone()),
                role: user.map(|u| u.role),
            }
        })
        .collect()
}

const SESSION_ROUTES: [&str; 2] = ["/dashboard", "/profile"];
const ADMIN_PREFIX: &str = "/admin";

/// Whether the given auth state may open `path`.
///
/// `/dashboard` and `/profile` need a session; anything under `/admin`
/// needs an admin session.
pub fn can_access(path: &str, auth: &AuthState) -> bool {
    if path.starts_with(ADMIN_PREFIX) {
        return auth.is_authenticated && auth.user.as_ref().is_some_and(|u| u.role == Role::Admin);
    }
    if SESSION_ROUTES.iter().any(|route| path.starts_with(route)) {
        return auth.is_authenticated;
    }
    true
}

/// Path to reopen on a cold start, if the persisted one is worth restoring.
pub fn restore_target<'a>(persisted: &'a str, auth: &AuthState) -> Option<&'a str> {
    if persisted.is_empty() || persisted == "/" {
        return None;
    }
    can_access(persisted, auth).then_some(persisted)
}
