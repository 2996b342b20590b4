//! Configuration resolution for `EventDesk`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/eventdesk/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete `EventDesk` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// What the persistence layer does when a write to the key-value store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// Log the failure and carry on as if the write happened.
    #[default]
    Log,
    /// Report the failure to the caller as a degraded-storage error.
    Surface,
}

impl std::str::FromStr for WriteFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "log" => Ok(Self::Log),
            "surface" => Ok(Self::Surface),
            other => Err(Error::Config(format!(
                "unknown write failure policy '{other}' (expected 'log' or 'surface')"
            ))),
        }
    }
}

/// Key-value storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// `SQLite` file backing the store. `None` means the platform default.
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub write_failures: WriteFailurePolicy,
}

/// Simulated network latency applied by every async action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatencyConfig {
    pub simulated_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            simulated_ms: 1000,
        }
    }
}

impl LatencyConfig {
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.simulated_ms)
    }
}

/// Concurrency controls for read-modify-write actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConcurrencyConfig {
    /// Serialize read-modify-write sequences per collection.
    pub serialize_writes: bool,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            serialize_writes: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Resolved database path: configured value or the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(database_path)
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        let global = load_config_file(&global_path)?;
        merge_config(&mut config, global);
    }

    if let Some(path) = explicit {
        let file = load_config_file(path)?;
        merge_config(&mut config, file);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eventdesk").join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eventdesk").join("eventdesk.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if overlay.storage.database_path.is_some() {
        base.storage.database_path = overlay.storage.database_path;
    }
    base.storage.write_failures = overlay.storage.write_failures;
    base.latency = overlay.latency;
    base.concurrency = overlay.concurrency;
    base.log = overlay.log;
}

/// Apply `EVENTDESK_*` overrides using the given variable lookup.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = lookup("EVENTDESK_DB_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("EVENTDESK_LATENCY_MS") {
        config.latency.simulated_ms = val
            .parse()
            .map_err(|_| Error::Config(format!("EVENTDESK_LATENCY_MS is not a number: {val}")))?;
    }
    if let Some(val) = lookup("EVENTDESK_WRITE_FAILURES") {
        config.storage.write_failures = val.parse()?;
    }
    if let Some(val) = lookup("EVENTDESK_SERIALIZE_WRITES") {
        config.concurrency.serialize_writes = matches!(val.as_str(), "1" | "true" | "yes");
    }
    if let Some(val) = lookup("EVENTDESK_LOG_LEVEL") {
        config.log.level = val;
    }
    Ok(())
}
