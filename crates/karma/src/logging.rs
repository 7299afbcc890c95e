//! Logging initialization with an explicit handle.
//!
//! The subscriber is constructed and installed at one defined point and
//! handed back as a [`LogGuard`] the application owns — there is no
//! lazily-created logger that springs into existence on first use.
//! Dropping the guard marks the defined teardown point (the final log
//! line before shutdown).

use tracing_subscriber::EnvFilter;

use crate::KarmaError;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset,
    /// e.g. `"info"` or `"karma_session=debug,info"`.
    pub filter: String,
    /// ANSI colors in output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

/// Owner's handle to the installed logging stack.
///
/// Keep it alive for the life of the application; its drop is the
/// defined teardown point.
#[must_use = "dropping the guard ends the logging scope"]
pub struct LogGuard {
    _private: (),
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::debug!("logging torn down");
    }
}

/// Builds and installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the configured filter when set. Initializing
/// twice is a hard error rather than a silent re-install — two halves
/// of an application fighting over the logger is a bug worth surfacing.
///
/// # Errors
/// [`KarmaError::LoggingAlreadyInitialized`] on a second call.
pub fn init_logging(config: LogConfig) -> Result<LogGuard, KarmaError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| KarmaError::LoggingAlreadyInitialized)?;

    tracing::info!("logging initialized");
    Ok(LogGuard { _private: () })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_loudly() {
        // Both calls in one test: the global subscriber is per-process.
        let first = init_logging(LogConfig::default());
        assert!(first.is_ok());

        let second = init_logging(LogConfig::default());
        assert!(matches!(
            second,
            Err(KarmaError::LoggingAlreadyInitialized)
        ));
    }
}
