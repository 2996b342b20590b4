//! Seed data used for first runs and for the mock identity check.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Map;

use crate::models::{Event, Id, Registration, RegistrationStatus, Role, User};

/// Password shared by both fixture identities.
pub const FIXTURE_PASSWORD: &str = "password";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ATTENDEE_EMAIL: &str = "user@example.com";
pub const ADMIN_TOKEN: &str = "mock-jwt-token-for-admin";
pub const ATTENDEE_TOKEN: &str = "mock-jwt-token-for-user";

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_default()
}

pub fn admin() -> User {
    User {
        id: Id::from("1"),
        name: "Admin User".to_string(),
        email: ADMIN_EMAIL.to_string(),
        role: Role::Admin,
    }
}

pub fn attendee() -> User {
    User {
        id: Id::from("2"),
        name: "Regular User".to_string(),
        email: ATTENDEE_EMAIL.to_string(),
        role: Role::Attendee,
    }
}

pub fn users() -> Vec<User> {
    vec![admin(), attendee()]
}

/// Match a credential pair against the two fixture identities.
pub fn authenticate(email: &str, password: &str) -> Option<(User, &'static str)> {
    if password != FIXTURE_PASSWORD {
        return None;
    }
    match email {
        ADMIN_EMAIL => Some((admin(), ADMIN_TOKEN)),
        ATTENDEE_EMAIL => Some((attendee(), ATTENDEE_TOKEN)),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn event(
    id: &str,
    title: &str,
    description: &str,
    location: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_attendees: Option<u32>,
    created: DateTime<Utc>,
) -> Event {
    Event {
        id: Id::from(id),
        title: title.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        start_date: start,
        end_date: end,
        max_attendees,
        is_published: true,
        created_at: created,
        updated_at: created,
        extra: Map::new(),
    }
}

pub fn events() -> Vec<Event> {
    vec![
        event(
            "1",
            "Tech Innovation Conference",
            "A day of talks on the latest advances in software and hardware.",
            "Paris Convention Center",
            ts(2025, 6, 15, 9, 0),
            ts(2025, 6, 15, 18, 0),
            Some(200),
            ts(2025, 1, 10, 10, 0),
        ),
        event(
            "2",
            "Web Development Workshop",
            "Hands-on workshop covering modern front-end tooling.",
            "Lyon Tech Hub",
            ts(2025, 7, 2, 14, 0),
            ts(2025, 7, 2, 17, 30),
            Some(30),
            ts(2025, 2, 1, 8, 30),
        ),
        event(
            "3",
            "Startup Networking Evening",
            "Meet founders, investors and engineers over drinks.",
            "Station F, Paris",
            ts(2025, 7, 20, 19, 0),
            ts(2025, 7, 20, 23, 0),
            None,
            ts(2025, 3, 5, 16, 0),
        ),
        event(
            "4",
            "Data Science Bootcamp",
            "Three days of intensive training in data analysis.",
            "Bordeaux Campus",
            ts(2025, 9, 8, 9, 0),
            ts(2025, 9, 10, 17, 0),
            Some(50),
            ts(2025, 4, 12, 11, 15),
        ),
    ]
}

pub fn registrations() -> Vec<Registration> {
    vec![
        Registration {
            id: Id::from("1"),
            event_id: Id::from("1"),
            user_id: Id::from("2"),
            registration_date: ts(2025, 3, 15, 14, 30),
            status: RegistrationStatus::Confirmed,
            checked_in: false,
        },
        Registration {
            id: Id::from("2"),
            event_id: Id::from("2"),
            user_id: Id::from("2"),
            registration_date: ts(2025, 4, 10, 9, 45),
            status: RegistrationStatus::Confirmed,
            checked_in: false,
        },
    ]
}
