//! Navigation subcommands: goto, clear, show.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use clap::Subcommand;

use eventdesk_core::state::selectors;

use crate::context::Context;
use crate::output::report;

/// Navigation subcommand actions.
#[derive(Subcommand, Debug)]
pub enum NavAction {
    /// Record a visited path
    Goto {
        /// Path, e.g. /events/2
        path: String,
    },
    /// Reset navigation to /
    Clear,
    /// Show current and previous paths
    Show,
}

/// Execute a navigation subcommand.
pub async fn run(ctx: &Context, action: NavAction) -> anyhow::Result<()> {
    match action {
        NavAction::Goto { path } => {
            let allowed = ctx
                .actions
                .store()
                .read(|s| selectors::can_access(&path, &s.auth));
            if !allowed {
                anyhow::bail!("{path} requires a session with the right role");
            }
            let result = ctx.actions.set_current_path(path.as_str()).await;
            report(ctx.json, result, "path", |out, ()| writeln!(out, "At {path}"))
        }
        NavAction::Clear => {
            let result = ctx.actions.clear_navigation_history().await;
            report(ctx.json, result, "path", |out, ()| writeln!(out, "Navigation cleared"))
        }
        NavAction::Show => show(ctx),
    }
}

fn show(ctx: &Context) -> anyhow::Result<()> {
    let (nav, auth) = ctx
        .actions
        .store()
        .read(|s| (s.navigation.clone(), s.auth.clone()));
    let mut out = io::stdout();
    if ctx.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&nav)?)?;
        return Ok(());
    }
    writeln!(out, "Current:  {}", nav.current_path)?;
    writeln!(
        out,
        "Previous: {}",
        nav.previous_path.as_deref().unwrap_or("-")
    )?;
    if let Some(target) = selectors::restore_target(&nav.current_path, &auth) {
        writeln!(out, "Next start resumes at {target}")?;
    }
    Ok(())
}
