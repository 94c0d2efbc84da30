// Logging module - Logging infrastructure
use crate::domain::error::{StudentsError, StudentsResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive: `verbose` forces debug, otherwise the
/// configured level, falling back to `warn` for unknown names.
pub fn level_directive(configured: &str, verbose: bool) -> &'static str {
    if verbose {
        return "debug";
    }
    match configured.trim().to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        "off" => "off",
        _ => "warn",
    }
}

/// Initialize logging system.
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so stdout only
/// carries command results.
pub fn init_logging(configured_level: &str, verbose: bool) -> StudentsResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(configured_level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| StudentsError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(level_directive("error", true), "debug");
    }

    #[test]
    fn test_configured_levels() {
        assert_eq!(level_directive("INFO", false), "info");
        assert_eq!(level_directive("warning", false), "warn");
        assert_eq!(level_directive("trace", false), "trace");
        assert_eq!(level_directive("loud", false), "warn");
    }

    #[test]
    fn test_logging_init_twice_fails_cleanly() {
        // Whichever call installs the subscriber first wins; the other must
        // report an error instead of panicking.
        let first = init_logging("info", false);
        let second = init_logging("info", false);
        assert!(first.is_err() || second.is_err());
    }
}
