//! Error types for `EventDesk` core library.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `EventDesk` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for configuration and I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes surfaced by domain actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced event or registration does not exist.
    NotFound,
    /// Duplicate registration for the same (event, user) pair.
    Conflict,
    /// A required identifier is missing.
    Validation,
    /// Credentials rejected, or no session where one is required.
    AuthRequired,
    /// The key-value store failed to read or write.
    StorageDegraded,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::AuthRequired => "auth_required",
            Self::StorageDegraded => "storage_degraded",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
