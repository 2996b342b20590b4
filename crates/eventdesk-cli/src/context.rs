//! Per-invocation wiring: open the store, build state and actions, run the
//! bootstrapper, and flush everything back on exit.

use std::sync::Arc;

use anyhow::Context as _;
use tracing::{debug, info};

use eventdesk_core::kv::SqliteKv;
use eventdesk_core::models::User;
use eventdesk_core::{Actions, BootReport, Bootstrapper, Config, Persistence, StateStore};

pub struct Context {
    pub actions: Actions<SqliteKv>,
    pub boot: BootReport,
    pub json: bool,
}

impl Context {
    pub async fn open(config: &Config, json: bool) -> anyhow::Result<Self> {
        let path = config
            .database_path()
            .context("Cannot determine a database path. Use --db-path <file>")?;
        let kv = SqliteKv::open(&path)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        let persistence = Persistence::new(kv, config.storage.write_failures);
        let store = Arc::new(StateStore::init(&persistence).await);
        let actions = Actions::from_config(persistence, store, config);
        let boot = Bootstrapper::new(&actions).run().await?;
        debug!(?boot, "Context ready");

        Ok(Self { actions, boot, json })
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.actions.store().read(|s| s.auth.user.clone())
    }

    /// Flush state back to storage and close the database.
    pub async fn close(self) -> anyhow::Result<()> {
        self.actions
            .store()
            .teardown(self.actions.persistence())
            .await
            .context("Failed to save session state")?;
        self.discard().await;
        Ok(())
    }

    /// Close the database without flushing state.
    pub async fn discard(self) {
        self.actions.persistence().kv().backend().close().await;
        info!("Database closed");
    }
}
