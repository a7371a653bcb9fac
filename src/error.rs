//! Error types for Botyard
//!
//! Defines a comprehensive error enum covering all failure modes across the system.
//! Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Botyard operations
pub type Result<T> = std::result::Result<T, BotyardError>;

/// Comprehensive error type for Botyard operations
#[derive(Error, Debug)]
pub enum BotyardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(String),

    /// A bot with the same name is already registered
    #[error("A bot named '{0}' is already registered")]
    DuplicateName(String),

    /// No bot matched the given identifier (by id or by name)
    #[error("No bot found matching '{0}'")]
    BotNotFound(String),

    /// An update targeted a row id that does not exist
    #[error("No registry record with id {0}")]
    RecordNotFound(i64),

    /// The configured entrypoint file does not exist on disk
    #[error("Entrypoint does not exist: {}", .0.display())]
    EntrypointMissing(PathBuf),

    /// Process launch failed; the registry was left untouched
    #[error("Failed to spawn bot process: {0}")]
    Spawn(String),

    /// Delivering a signal to a live process failed
    #[error("Failed to signal process: {0}")]
    Signal(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Git2 library errors
    #[error("Git library error: {0}")]
    Git2(#[from] git2::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
