//! Tracing Setup
//!
//! `TigerStyle`: Optional subscriber with graceful fallback. Never panics if
//! a subscriber is already installed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mustexist::telemetry::{init_tracing, TelemetryConfig};
//!
//! // Filter from RUST_LOG, or `mustexist=info`
//! let _ = init_tracing(TelemetryConfig::default());
//! ```
//!
//! Logs go to stderr: harnesses commonly assert on a suite's exact stdout.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::constants::{LOG_FILTER_DEFAULT, LOG_FILTER_ENV_VAR};

/// Tracing setup errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Filter directive could not be parsed
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("tracing subscriber already initialized: {reason}")]
    AlreadyInitialized {
        /// Reason reported by the subscriber registry
        reason: String,
    },
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Configuration for the fmt subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `mustexist=debug`
    pub filter: String,
    /// Include the event target in each line
    pub with_target: bool,
    /// Emit ANSI colours
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: std::env::var(LOG_FILTER_ENV_VAR)
                .unwrap_or_else(|_| LOG_FILTER_DEFAULT.to_string()),
            with_target: true,
            ansi: false,
        }
    }
}

impl TelemetryConfig {
    /// Use `filter` instead of `RUST_LOG`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Toggle event targets.
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Toggle ANSI colours.
    #[must_use]
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// # Errors
/// `TelemetryError::InvalidFilter` for a bad directive,
/// `TelemetryError::AlreadyInitialized` if a subscriber is already set.
pub fn init_tracing(config: TelemetryConfig) -> Result<()> {
    let filter = config.env_filter()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = TelemetryConfig::default()
            .with_filter("mustexist=debug")
            .with_target(false)
            .with_ansi(true);

        assert_eq!(config.filter, "mustexist=debug");
        assert!(!config.with_target);
        assert!(config.ansi);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = TelemetryConfig::default().with_filter("mustexist=notalevel");
        assert!(matches!(
            init_tracing(config),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_second_init_reports_already_initialized() {
        let config = TelemetryConfig::default().with_filter("mustexist=warn");
        let first = init_tracing(config.clone());
        let second = init_tracing(config);

        // Another test binary thread may have won the first call.
        assert!(first.is_ok() || matches!(first, Err(TelemetryError::AlreadyInitialized { .. })));
        assert!(matches!(
            second,
            Err(TelemetryError::AlreadyInitialized { .. })
        ));
    }
}
