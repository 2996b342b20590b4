//! `EventDesk` CLI Library
//!
//! Terminal front end over the `eventdesk-core` data layer. Every
//! invocation opens the local store, restores the session, runs one
//! command and flushes state back.

pub mod auth_cmd;
pub mod cli;
pub mod config;
pub mod context;
pub mod events_cmd;
pub mod nav_cmd;
pub mod output;
pub mod registration_cmd;
