//! Botyard - Registry and process supervisor for self-hosted bot processes
//!
//! Botyard keeps a durable registry of bot worker programs (typically
//! Discord bots) and supervises the OS process behind each one:
//! registering launch configuration, starting and stopping processes with
//! their output appended to per-bot log files, and reconciling the stored
//! status/pid with what the operating system actually reports.
//!
//! # Architecture
//!
//! - **bot**: Core record types (BotRecord, BotSpec, BotSelector, BotStatus)
//! - **registry**: SQLite-backed persistence of bot records
//! - **supervisor**: Lifecycle manager and the Unix process layer it drives
//! - **git**: Repository cloning for bot ingestion
//! - **config**: ~/.config/botyard/config.yaml handling

// Core modules
pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod supervisor;

// Components
pub mod git;

// Re-exports
pub use error::{BotyardError, Result};
