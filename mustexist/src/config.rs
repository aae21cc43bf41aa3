//! Check Configuration
//!
//! `TigerStyle`: Sensible defaults, builder pattern, explicit over implicit.

use std::env;
use std::num::NonZeroUsize;

use thiserror::Error;

use crate::constants::CONCURRENCY_ENV_VAR;

/// Errors building a configuration or a guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Concurrency limit was not a positive integer
    #[error("invalid {var}: expected a positive integer, got {value:?}")]
    InvalidConcurrency {
        /// Variable that held the value
        var: &'static str,
        /// Rejected value
        value: String,
    },

    /// A guard was built without any store
    #[error("at least one store is required")]
    NoStores,
}

// =============================================================================
// MustExistConfig
// =============================================================================

/// Knobs for a validation run.
///
/// # Example
///
/// ```rust
/// use mustexist::MustExistConfig;
///
/// let config = MustExistConfig::default().with_concurrency_limit(16);
/// assert_eq!(config.concurrency_limit.map(|n| n.get()), Some(16));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustExistConfig {
    /// Maximum probes in flight per store. Never zero, since a zero-width
    /// buffer would stall the run.
    ///
    /// Default: `None` (every probe dispatched at once)
    pub concurrency_limit: Option<NonZeroUsize>,

    /// Whether failing stores log their missing entries at `warn`.
    ///
    /// Default: true
    pub log_missing: bool,
}

impl Default for MustExistConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: None,
            log_missing: true,
        }
    }
}

impl MustExistConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the environment (`MUSTEXIST_CONCURRENCY`).
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConcurrency` if the variable is set to
    /// anything but a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    ///
    /// # Errors
    /// See [`MustExistConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CONCURRENCY_ENV_VAR) {
            let limit = raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidConcurrency {
                    var: CONCURRENCY_ENV_VAR,
                    value: raw.clone(),
                })?;
            config.concurrency_limit = Some(limit);
        }

        Ok(config)
    }

    /// Bound the probes in flight per store. Report order is unaffected.
    ///
    /// # Panics
    /// Panics if `limit` is zero.
    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        let Some(limit) = NonZeroUsize::new(limit) else {
            panic!("concurrency limit must be positive");
        };
        self.concurrency_limit = Some(limit);
        self
    }

    /// Dispatch every probe at once.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.concurrency_limit = None;
        self
    }

    /// Do not log missing entries (the error still carries them).
    #[must_use]
    pub fn without_missing_logs(mut self) -> Self {
        self.log_missing = false;
        self
    }
}
