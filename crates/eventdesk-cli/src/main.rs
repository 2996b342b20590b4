//! `EventDesk` CLI
//!
//! Local event manager: browse and edit events, register for them, and
//! keep a session across runs.

use clap::Parser;
use tracing::info;

use eventdesk_cli::cli::{self, Cli};
use eventdesk_cli::context::Context;
use eventdesk_core::tracing_init::{default_filter, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = args.global.resolve()?;

    init_tracing(
        &default_filter("eventdesk_cli", &config.log.level),
        config.log.json,
    );
    info!(version = env!("CARGO_PKG_VERSION"), "Starting eventdesk");

    let ctx = Context::open(&config, args.global.json).await?;
    cli::run(ctx, args.command).await
}
