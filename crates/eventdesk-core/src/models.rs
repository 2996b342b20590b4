//! Data model for events, registrations and users.
//!
//! Records are stored as camelCase JSON. Identifiers go through [`Id`], which
//! normalizes string and numeric JSON ids to one canonical string so that
//! comparisons never need ad hoc coercion.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Canonical identifier shared by every record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&String> for Id {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(i64),
            UInt(u64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => Self::from(s),
            Raw::Int(n) => Self::from(n),
            Raw::UInt(n) => Self::from(n),
            #[allow(clippy::cast_possible_truncation)]
            Raw::Float(f) if f.fract().abs() < f64::EPSILON && f.abs() < 9.0e15 => Self::from(f as i64),
            Raw::Float(f) => Self(f.to_string()),
        })
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Attendee,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Attendee => "Attendee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A known user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-up input. The password is accepted but never stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// An authenticated user together with its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

const fn default_true() -> bool {
    true
}

/// JSON names of the typed [`Event`] fields. These never live in `extra`.
const EVENT_FIELDS: [&str; 10] = [
    "id",
    "title",
    "description",
    "location",
    "startDate",
    "endDate",
    "maxAttendees",
    "isPublished",
    "createdAt",
    "updatedAt",
];

fn passthrough(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !EVENT_FIELDS.contains(&key.as_str()));
    extra
}

/// A schedulable activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Advisory capacity; `None` means unlimited.
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(default = "default_true")]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fields the model does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build a new published event from a draft.
    ///
    /// Extra keys that shadow a typed field are dropped.
    pub fn from_draft(id: Id, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            start_date: draft.start_date,
            end_date: draft.end_date,
            max_attendees: draft.max_attendees,
            is_published: true,
            created_at: now,
            updated_at: now,
            extra: passthrough(draft.extra),
        }
    }

    /// Shallow-merge `patch` over this record.
    ///
    /// `id` and `created_at` never change; `updated_at` becomes `now`. Extra
    /// keys that shadow a typed field are dropped.
    #[must_use]
    pub fn merged(mut self, patch: EventPatch, now: DateTime<Utc>) -> Self {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(max) = patch.max_attendees {
            self.max_attendees = max;
        }
        if let Some(published) = patch.is_published {
            self.is_published = published;
        }
        self.extra.extend(passthrough(patch.extra));
        self.updated_at = now;
        self
    }

    /// Run the form-boundary checks against a stored record.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validate_fields(
            &self.title,
            &self.description,
            &self.location,
            self.start_date,
            self.end_date,
            self.max_attendees,
        )
    }
}

/// Caller-supplied fields for a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDraft {
    /// Check the draft the way the event form does before submitting.
    ///
    /// Returns every failing field, not just the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validate_fields(
            &self.title,
            &self.description,
            &self.location,
            self.start_date,
            self.end_date,
            self.max_attendees,
        )
    }
}

/// Partial update for an event. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// `Some(None)` clears the capacity.
    pub max_attendees: Option<Option<u32>>,
    pub is_published: Option<bool>,
    pub extra: Map<String, Value>,
}

impl EventPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// A single failing form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn validate_fields(
    title: &str,
    description: &str,
    location: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_attendees: Option<u32>,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError {
            field: "title",
            message: "Title is required",
        });
    }
    if description.trim().is_empty() {
        errors.push(FieldError {
            field: "description",
            message: "Description is required",
        });
    }
    if location.trim().is_empty() {
        errors.push(FieldError {
            field: "location",
            message: "Location is required",
        });
    }
    if max_attendees == Some(0) {
        errors.push(FieldError {
            field: "maxAttendees",
            message: "Maximum attendees must be a positive number",
        });
    }
    if start > end {
        errors.push(FieldError {
            field: "endDate",
            message: "End date must be after the start date",
        });
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Registration status. Only `Confirmed` is produced here; anything else
/// found in storage is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationStatus {
    Confirmed,
    Other(String),
}

impl From<String> for RegistrationStatus {
    fn from(value: String) -> Self {
        if value == "Confirmed" {
            Self::Confirmed
        } else {
            Self::Other(value)
        }
    }
}

impl From<RegistrationStatus> for String {
    fn from(value: RegistrationStatus) -> Self {
        match value {
            RegistrationStatus::Confirmed => "Confirmed".to_string(),
            RegistrationStatus::Other(s) => s,
        }
    }
}

/// A user's claim on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Id,
    pub event_id: Id,
    pub user_id: Id,
    pub registration_date: DateTime<Utc>,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub checked_in: bool,
}

impl Registration {
    pub fn matches(&self, event_id: &Id, user_id: &Id) -> bool {
        &self.event_id == event_id && &self.user_id == user_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Rust meetup".into(),
            description: "Talks".into(),
            location: "Lyon".into(),
            start_date: at(18),
            end_date: at(21),
            max_attendees: Some(40),
            extra: Map::new(),
        }
    }

    #[test]
    fn id_from_number_and_string_are_equal() {
        let a: Id = serde_json::from_value(json!("2")).unwrap();
        let b: Id = serde_json::from_value(json!(2)).unwrap();
        let c: Id = serde_json::from_value(json!(2.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(Id::from(2_u64), a);
        assert_eq!(serde_json::to_value(&a).unwrap(), json!("2"));
    }

    #[test]
    fn registration_with_numeric_ids_normalizes() {
        let reg: Registration = serde_json::from_value(json!({
            "id": 7,
            "eventId": "1",
            "userId": 2,
            "registrationDate": "2025-03-15T14:30:00Z",
            "status": "Confirmed"
        }))
        .unwrap();
        assert!(reg.matches(&Id::from("1"), &Id::from("2")));
        assert!(!reg.checked_in);
    }

    #[test]
    fn unknown_status_passes_through() {
        let status: RegistrationStatus = serde_json::from_value(json!("Waitlisted")).unwrap();
        assert_eq!(status, RegistrationStatus::Other("Waitlisted".into()));
        assert_eq!(serde_json::to_value(status).unwrap(), json!("Waitlisted"));
    }

    #[test]
    fn event_uses_camel_case_and_keeps_extra_fields() {
        let mut d = draft();
        d.extra.insert("category".into(), json!("tech"));
        let event = Event::from_draft(Id::from("10"), d, at(9));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["maxAttendees"], json!(40));
        assert_eq!(value["isPublished"], json!(true));
        assert_eq!(value["category"], json!("tech"));

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn merge_changes_only_patched_fields() {
        let event = Event::from_draft(Id::from("10"), draft(), at(9));
        let merged = event.clone().merged(EventPatch::title("X"), at(12));

        assert_eq!(merged.title, "X");
        assert_eq!(merged.updated_at, at(12));
        assert_eq!(merged.id, event.id);
        assert_eq!(merged.created_at, event.created_at);
        assert_eq!(merged.description, event.description);
        assert_eq!(merged.max_attendees, event.max_attendees);
    }

    #[test]
    fn extra_keys_cannot_shadow_typed_fields() {
        let d: EventDraft = serde_json::from_value(json!({
            "title": "Rust meetup",
            "description": "Talks",
            "location": "Lyon",
            "startDate": "2025-06-01T18:00:00Z",
            "endDate": "2025-06-01T21:00:00Z",
            "isPublished": false,
            "createdAt": "2000-01-01T00:00:00Z",
            "category": "tech"
        }))
        .unwrap();
        let event = Event::from_draft(Id::from("10"), d, at(9));
        assert!(event.is_published);
        assert_eq!(event.extra.keys().collect::<Vec<_>>(), vec!["category"]);

        let mut patch = EventPatch::title("Renamed");
        patch.extra.insert("id".into(), json!("zzz"));
        patch.extra.insert("updatedAt".into(), json!("2000-01-01T00:00:00Z"));
        let merged = event.merged(patch, at(12));
        assert_eq!(merged.id, Id::from("10"));
        assert_eq!(merged.extra.len(), 1);

        let raw = serde_json::to_string(&merged).unwrap();
        let back: Event = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, merged);
    }

    #[test]
    fn merge_can_clear_capacity() {
        let event = Event::from_draft(Id::from("10"), draft(), at(9));
        let patch = EventPatch {
            max_attendees: Some(None),
            ..EventPatch::default()
        };
        assert_eq!(event.merged(patch, at(10)).max_attendees, None);
    }

    #[test]
    fn validate_reports_every_field() {
        let bad = EventDraft {
            title: " ".into(),
            description: String::new(),
            location: "Paris".into(),
            start_date: at(20),
            end_date: at(19),
            max_attendees: Some(0),
            extra: Map::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "description", "maxAttendees", "endDate"]);
        assert!(draft().validate().is_ok());
    }
}
