//! Event subcommands: list, show, create, update, delete, participants.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::Map;

use eventdesk_core::models::{Event, EventDraft, EventPatch, FieldError};
use eventdesk_core::state::selectors;

use crate::context::Context;
use crate::output::{self, report};

/// Event subcommand actions.
#[derive(Subcommand, Debug)]
pub enum EventsAction {
    /// List all events
    List,
    /// Show one event
    Show {
        /// Event ID
        id: String,
    },
    /// Create a new event
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        /// Start time (RFC 3339, e.g. 2025-09-01T18:00:00Z)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End time (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Maximum attendees (omit for unlimited)
        #[arg(long)]
        max_attendees: Option<u32>,
    },
    /// Update fields of an existing event
    Update {
        /// Event ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long, conflicts_with = "unlimited")]
        max_attendees: Option<u32>,
        /// Remove the attendee limit
        #[arg(long)]
        unlimited: bool,
        /// Publish or unpublish the event
        #[arg(long)]
        published: Option<bool>,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
    /// List the participants of an event (admin only)
    Participants {
        /// Event ID
        id: String,
    },
}

/// Execute an events subcommand.
pub async fn run(ctx: &Context, action: EventsAction) -> anyhow::Result<()> {
    let actions = &ctx.actions;
    match action {
        EventsAction::List => {
            let result = actions.fetch_events().await;
            actions.set_current_path("/events").await?;
            report(ctx.json, result, "events", |out, events| {
                if events.is_empty() {
                    return writeln!(out, "No events");
                }
                for event in &events {
                    writeln!(out, "{}", output::event_line(event))?;
                }
                Ok(())
            })
        }
        EventsAction::Show { id } => {
            let result = actions.fetch_event(id.as_str()).await;
            if result.is_ok() {
                actions.set_current_path(format!("/events/{id}")).await?;
            }
            report(ctx.json, result, "event", |out, event| {
                output::write_event(out, &event)
            })
        }
        EventsAction::Create {
            title,
            description,
            location,
            start,
            end,
            max_attendees,
        } => {
            require_admin(ctx, "/admin/events/create")?;
            let draft = EventDraft {
                title,
                description,
                location,
                start_date: start,
                end_date: end,
                max_attendees,
                extra: Map::new(),
            };
            draft.validate().map_err(invalid)?;
            let result = actions.create_event(draft).await;
            report(ctx.json, result, "event", |out, event| {
                writeln!(out, "Created event {} ({})", event.id, event.title)
            })
        }
        EventsAction::Update {
            id,
            title,
            description,
            location,
            start,
            end,
            max_attendees,
            unlimited,
            published,
        } => {
            require_admin(ctx, &format!("/admin/events/{id}/edit"))?;
            let patch = EventPatch {
                title,
                description,
                location,
                start_date: start,
                end_date: end,
                max_attendees: if unlimited { Some(None) } else { max_attendees.map(Some) },
                is_published: published,
                extra: Map::new(),
            };
            if let Ok(current) = actions.fetch_event(id.as_str()).await {
                preview(current, &patch).map_err(invalid)?;
            }
            let result = actions.update_event(id.as_str(), patch).await;
            report(ctx.json, result, "event", |out, event| {
                writeln!(out, "Updated event {} ({})", event.id, event.title)
            })
        }
        EventsAction::Delete { id } => {
            require_admin(ctx, "/admin/dashboard")?;
            let result = actions.delete_event(id.as_str()).await;
            report(ctx.json, result, "id", |out, id| writeln!(out, "Deleted event {id}"))
        }
        EventsAction::Participants { id } => {
            let path = format!("/admin/events/{id}/participants");
            require_admin(ctx, &path)?;
            let event = actions.fetch_event(id.as_str()).await?;
            let result = actions.fetch_event_registrations(id.as_str()).await;
            actions.set_current_path(path).await?;
            let users = actions.persistence().users().await;
            let result = result.map(|regs| selectors::participants(&regs, &users));
            report(ctx.json, result, "participants", |out, participants| {
                writeln!(out, "{} ({} / {})", event.title, participants.len(), output::capacity(&event))?;
                for p in &participants {
                    writeln!(out, "  {}", output::participant_line(p))?;
                }
                Ok(())
            })
        }
    }
}

/// Refuse admin-only commands for anyone but a signed-in admin.
fn require_admin(ctx: &Context, path: &str) -> anyhow::Result<()> {
    let allowed = ctx
        .actions
        .store()
        .read(|s| selectors::can_access(path, &s.auth));
    if allowed {
        Ok(())
    } else {
        anyhow::bail!("Admin access required. Log in with an admin account first")
    }
}

/// Check what the event would look like after `patch`.
fn preview(current: Event, patch: &EventPatch) -> Result<(), Vec<FieldError>> {
    current.merged(patch.clone(), Utc::now()).validate()
}

fn invalid(errors: Vec<FieldError>) -> anyhow::Error {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::anyhow!("Invalid event: {}", details.join("; "))
}
