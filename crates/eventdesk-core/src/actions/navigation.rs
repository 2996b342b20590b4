use tracing::debug;

use super::{ActionResult, Actions};
use crate::kv::KvBackend;
use crate::persistence::ROOT_PATH;
use crate::state::NavigationAction;

impl<B: KvBackend> Actions<B> {
    /// Record a visited path and persist it for the next cold start.
    pub async fn set_current_path(&self, path: impl Into<String>) -> ActionResult<()> {
        let path = path.into();
        self.store.dispatch(NavigationAction::SetCurrentPath(path.clone()));
        self.persistence.store_current_path(&path).await?;
        debug!(path = %path, "Navigation recorded");
        Ok(())
    }

    /// Forget navigation history and go back to the root path.
    pub async fn clear_navigation_history(&self) -> ActionResult<()> {
        self.store.dispatch(NavigationAction::ClearHistory);
        self.persistence.store_current_path(ROOT_PATH).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::actions::testing;

    #[tokio::test]
    async fn path_is_tracked_and_persisted() {
        let (actions, _) = testing::actions();
        actions.set_current_path("/events").await.unwrap();
        actions.set_current_path("/events/2").await.unwrap();

        let nav = actions.store().snapshot().navigation;
        assert_eq!(nav.current_path, "/events/2");
        assert_eq!(nav.previous_path.as_deref(), Some("/events"));
        assert_eq!(actions.persistence().current_path().await, "/events/2");
    }

    #[tokio::test]
    async fn clearing_returns_to_root() {
        let (actions, _) = testing::actions();
        actions.set_current_path("/dashboard").await.unwrap();
        actions.clear_navigation_history().await.unwrap();

        let nav = actions.store().snapshot().navigation;
        assert_eq!(nav.current_path, "/");
        assert_eq!(nav.previous_path, None);
        assert_eq!(actions.persistence().current_path().await, "/");
    }
}
