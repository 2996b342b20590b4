//! Navigation slice. Persisting the path is the caller's job; this reducer
//! only tracks current and previous.

use serde::Serialize;

use crate::persistence::ROOT_PATH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    SetCurrentPath(String),
    ClearHistory,
}

impl NavigationAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetCurrentPath(_) => "navigation/setCurrentPath",
            Self::ClearHistory => "navigation/clearNavigationHistory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_path: String,
    pub previous_path: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::at(ROOT_PATH)
    }
}

impl NavigationState {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            current_path: path.into(),
            previous_path: None,
        }
    }

    #[must_use]
    pub fn reduce(mut self, action: &NavigationAction) -> Self {
        match action {
            NavigationAction::SetCurrentPath(path) => {
                let old = std::mem::replace(&mut self.current_path, path.clone());
                self.previous_path = Some(old);
            }
            NavigationAction::ClearHistory => {
                self = Self::default();
            }
        }
        self
    }
}
