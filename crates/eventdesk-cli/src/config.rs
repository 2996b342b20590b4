//! Global CLI flags and how they layer over the resolved configuration.
//!
//! Resolution order: defaults, global settings file, `--config` file,
//! `EVENTDESK_*` environment, then these flags.

use std::path::PathBuf;

use eventdesk_core::config::{self, Config, WriteFailurePolicy};

/// Flags accepted before any subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Database file path.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Simulated latency per action, in milliseconds.
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,

    /// What to do when a storage write fails ("log" or "surface").
    #[arg(long, global = true)]
    pub write_failures: Option<WriteFailurePolicy>,

    /// Log level for eventdesk crates (e.g. "info", "debug").
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Extra settings file merged over the global one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as `{"success": ...}` JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Load the layered configuration and apply these flags on top.
    pub fn resolve(&self) -> anyhow::Result<Config> {
        let mut config = config::load_config(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.db_path {
            config.storage.database_path = Some(path.clone());
        }
        if let Some(ms) = self.latency_ms {
            config.latency.simulated_ms = ms;
        }
        if let Some(policy) = self.write_failures {
            config.storage.write_failures = policy;
        }
        if let Some(level) = &self.log_level {
            config.log.level.clone_from(level);
        }
        if self.log_json {
            config.log.json = true;
        }
    }
}
