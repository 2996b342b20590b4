//! Auth subcommands: login, logout, signup, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use eventdesk_core::Restoration;
use eventdesk_core::models::{Credentials, NewUser};

use crate::context::Context;
use crate::output::report;

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Log in with email and password.
    Login {
        /// Email address.
        #[arg(short, long)]
        email: String,
        /// Password.
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the stored session.
    Logout,
    /// Create an attendee account and log in as it.
    Signup {
        /// Display name.
        #[arg(short, long)]
        name: String,
        /// Email address.
        #[arg(short, long)]
        email: String,
        /// Password.
        #[arg(short, long)]
        password: String,
    },
    /// Show current auth status.
    Status,
}

/// Execute an auth subcommand.
pub async fn run(ctx: &Context, action: AuthAction) -> anyhow::Result<()> {
    match action {
        AuthAction::Login { email, password } => {
            let result = ctx.actions.login(Credentials::new(email, password)).await;
            report(ctx.json, result, "session", |out, session| {
                writeln!(out, "Logged in as {} ({})", session.user.name, session.user.role)
            })
        }
        AuthAction::Logout => {
            let result = ctx.actions.logout().await;
            report(ctx.json, result, "session", |out, ()| writeln!(out, "Logged out"))
        }
        AuthAction::Signup {
            name,
            email,
            password,
        } => {
            let result = ctx
                .actions
                .register(NewUser {
                    name,
                    email,
                    password,
                })
                .await;
            report(ctx.json, result, "session", |out, session| {
                writeln!(out, "Account created for {} (id {})", session.user.email, session.user.id)
            })
        }
        AuthAction::Status => status(ctx),
    }
}

fn status(ctx: &Context) -> anyhow::Result<()> {
    let auth = ctx.actions.store().read(|s| s.auth.clone());
    let mut out = io::stdout();
    if ctx.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&auth)?)?;
        return Ok(());
    }
    match &auth.user {
        Some(user) if auth.is_authenticated => {
            writeln!(out, "Logged in as: {}", user.name)?;
            writeln!(out, "Email: {}", user.email)?;
            writeln!(out, "User ID: {}", user.id)?;
            writeln!(out, "Role: {}", user.role)?;
            if let Restoration::ByLogin(_) = ctx.boot.restored {
                writeln!(out, "(session restored from token)")?;
            }
        }
        _ => writeln!(out, "Not logged in")?,
    }
    Ok(())
}
