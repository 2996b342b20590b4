//! Shared tracing/logging initialization.
//!
//! The CLI and any embedding front end set up `tracing_subscriber` the same
//! way: an env-filter plus optional JSON output, always on stderr so that
//! command output on stdout stays clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"eventdesk_core=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Build the default filter string for a binary from a level name.
///
/// Both the core library and the named binary crate log at `level`;
/// everything else (sqlx, etc.) stays at `warn`.
pub fn default_filter(binary_crate: &str, level: &str) -> String {
    format!("warn,eventdesk_core={level},{binary_crate}={level}")
}
