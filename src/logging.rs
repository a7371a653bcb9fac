//! Logging configuration using tracing
//!
//! Provides structured logging to stderr with support for the RUST_LOG environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Sets up structured logging with:
/// - Filtering via RUST_LOG environment variable (defaults to "warn" for quiet output)
/// - Formatted output to stderr
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - Show info and above
/// - `RUST_LOG=debug` - Show debug and above
/// - `RUST_LOG=botyard=trace` - Trace level for the botyard crate
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init() -> crate::Result<()> {
    // Respect RUST_LOG, defaulting to "warn" for quiet CLI output
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .pretty(),
        )
        .try_init()
        .map_err(|e| crate::BotyardError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging() {
        // First call may succeed or fail depending on test order
        let result = init();
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_init_test_helper() {
        init_test();
        init_test(); // Can be called multiple times
    }

    #[test]
    fn test_logging_macros() {
        init_test();

        tracing::trace!("This is a trace message");
        tracing::debug!("This is a debug message");
        tracing::info!("This is an info message");
        tracing::warn!("This is a warning message");
        tracing::error!("This is an error message");

        tracing::info!(bot = "test", action = "test_run", "Testing structured logging");
    }
}
