//! Command-line definition and dispatch.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use clap::{Parser, Subcommand};

use crate::auth_cmd::{self, AuthAction};
use crate::config::GlobalArgs;
use crate::context::Context;
use crate::events_cmd::{self, EventsAction};
use crate::nav_cmd::{self, NavAction};
use crate::registration_cmd;

#[derive(Parser, Debug)]
#[command(name = "eventdesk")]
#[command(version, about = "Manage events and registrations from the terminal", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse and manage events
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },
    /// Register the signed-in user for an event
    Register {
        /// Event ID
        event_id: String,
    },
    /// Cancel a registration
    Cancel {
        /// Registration ID
        registration_id: String,
    },
    /// List your registrations, or an event's with --event
    Registrations {
        #[arg(long)]
        event: Option<String>,
    },
    /// Log in, log out, sign up, show status
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Inspect or change the remembered navigation path
    Nav {
        #[command(subcommand)]
        action: NavAction,
    },
    /// Delete every stored record (fixtures are reseeded on the next run)
    Reset,
}

/// Run one command against an opened context, then close it.
pub async fn run(ctx: Context, command: Command) -> anyhow::Result<()> {
    if let Command::Reset = command {
        ctx.actions.persistence().reset_all().await?;
        ctx.discard().await;
        let mut out = io::stdout();
        writeln!(out, "All stored data cleared")?;
        return Ok(());
    }

    let result = match command {
        Command::Events { action } => events_cmd::run(&ctx, action).await,
        Command::Register { event_id } => registration_cmd::register(&ctx, &event_id).await,
        Command::Cancel { registration_id } => registration_cmd::cancel(&ctx, &registration_id).await,
        Command::Registrations { event } => registration_cmd::list(&ctx, event.as_deref()).await,
        Command::Auth { action } => auth_cmd::run(&ctx, action).await,
        Command::Nav { action } => nav_cmd::run(&ctx, action).await,
        Command::Reset => Ok(()),
    };

    // Flush even when the command failed; its state changes still count.
    ctx.close().await?;
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "eventdesk",
            "events",
            "list",
            "--json",
            "--latency-ms",
            "0",
            "--write-failures",
            "surface",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.latency_ms, Some(0));
        assert!(matches!(
            cli.command,
            Command::Events {
                action: EventsAction::List
            }
        ));
    }

    #[test]
    fn create_requires_rfc3339_dates() {
        let err = Cli::try_parse_from([
            "eventdesk", "events", "create", "--title", "T", "--description", "D", "--location",
            "L", "--start", "tomorrow", "--end", "2025-09-01T20:00:00Z",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn update_rejects_limit_with_unlimited() {
        let err = Cli::try_parse_from([
            "eventdesk", "events", "update", "2", "--max-attendees", "5", "--unlimited",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn bad_write_policy_is_rejected() {
        assert!(Cli::try_parse_from(["eventdesk", "--write-failures", "ignore", "reset"]).is_err());
    }
}
