//! `EventDesk` Core Library
//!
//! Client-side data layer for the event manager:
//! - Key-value storage backends (`SQLite`, in-memory)
//! - Typed persistence of events, registrations, users and navigation
//! - Domain actions with simulated latency
//! - Application state slices and the session bootstrapper

pub mod actions;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod kv;
pub mod models;
pub mod persistence;
pub mod state;
pub mod tracing_init;

pub use actions::{ActionError, ActionResult, Actions};
pub use bootstrap::{BootReport, Bootstrapper, Restoration};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use persistence::Persistence;
pub use state::{AppState, StateStore};
