//! Rendering of action results.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use serde::Serialize;

use eventdesk_core::actions::{ActionResult, to_response};
use eventdesk_core::models::{Event, Registration};
use eventdesk_core::state::selectors::Participant;

/// Print `result` either as the tagged JSON shape or through `human`.
///
/// A failed result is printed (in JSON mode) and then returned as an error
/// so the process exits non-zero.
pub fn report<T: Serialize>(
    json: bool,
    result: ActionResult<T>,
    key: &str,
    human: impl FnOnce(&mut dyn Write, T) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&to_response(&result, key))?)?;
    }
    match result {
        Ok(value) if !json => human(&mut out, value)?,
        Ok(_) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn capacity(event: &Event) -> String {
    event
        .max_attendees
        .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
}

pub fn event_line(event: &Event) -> String {
    format!(
        "{:<14} {}  {}  ({})",
        event.id,
        event.start_date.format(DATE_FORMAT),
        event.title,
        event.location
    )
}

pub fn write_event(out: &mut dyn Write, event: &Event) -> io::Result<()> {
    writeln!(out, "{}", event.title)?;
    writeln!(out, "  id:          {}", event.id)?;
    writeln!(out, "  location:    {}", event.location)?;
    writeln!(out, "  starts:      {}", event.start_date.format(DATE_FORMAT))?;
    writeln!(out, "  ends:        {}", event.end_date.format(DATE_FORMAT))?;
    writeln!(out, "  capacity:    {}", capacity(event))?;
    writeln!(out, "  published:   {}", if event.is_published { "yes" } else { "no" })?;
    writeln!(out)?;
    writeln!(out, "{}", event.description)
}

pub fn registration_line(registration: &Registration) -> String {
    format!(
        "{:<14} event {:<14} user {:<14} {}",
        registration.id,
        registration.event_id,
        registration.user_id,
        registration.registration_date.format(DATE_FORMAT)
    )
}

pub fn participant_line(participant: &Participant) -> String {
    let checked = if participant.registration.checked_in {
        "checked in"
    } else {
        "not checked in"
    };
    format!(
        "{:<20} {:<28} {}",
        participant.name, participant.email, checked
    )
}
