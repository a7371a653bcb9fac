//! Persisted bot registry
//!
//! SQLite-backed storage of bot records: launch configuration plus the
//! last recorded status and pid for each registered bot.

mod sqlite;

pub use sqlite::{Registry, RegistryConfig};
