//! Registration commands: register, cancel, list.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use eventdesk_core::models::Id;

use crate::context::Context;
use crate::output::{self, report};

/// Register the signed-in user for an event.
pub async fn register(ctx: &Context, event_id: &str) -> anyhow::Result<()> {
    let user_id = ctx.current_user().map(|u| u.id);
    let result = ctx
        .actions
        .register_for_event(Some(Id::from(event_id)), user_id)
        .await;
    report(ctx.json, result, "registration", |out, registration| {
        writeln!(
            out,
            "Registered for event {} (registration {})",
            registration.event_id, registration.id
        )
    })
}

/// Cancel a registration by its id.
pub async fn cancel(ctx: &Context, registration_id: &str) -> anyhow::Result<()> {
    let result = ctx.actions.cancel_registration(registration_id).await;
    report(ctx.json, result, "id", |out, id| {
        writeln!(out, "Cancelled registration {id}")
    })
}

/// List the signed-in user's registrations, or an event's.
pub async fn list(ctx: &Context, event: Option<&str>) -> anyhow::Result<()> {
    let result = match event {
        Some(event_id) => ctx.actions.fetch_event_registrations(event_id).await,
        None => {
            let Some(user) = ctx.current_user() else {
                anyhow::bail!("Not logged in. Use `eventdesk auth login` or pass --event <id>");
            };
            let result = ctx.actions.fetch_registrations(user.id).await;
            ctx.actions.set_current_path("/dashboard").await?;
            result
        }
    };
    report(ctx.json, result, "registrations", |out, registrations| {
        if registrations.is_empty() {
            return writeln!(out, "No registrations");
        }
        for registration in &registrations {
            writeln!(out, "{}", output::registration_line(registration))?;
        }
        Ok(())
    })
}
