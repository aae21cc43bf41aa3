//! SimConfig - Simulation Configuration
//!
//! TigerStyle: Seed management for deterministic testing.

use std::env;

use rand::Rng;

use crate::constants::{DST_LATENCY_MS_MAX, DST_SEED_ENV_VAR};

/// Configuration for a simulated store.
///
/// TigerStyle:
/// - Immutable after creation
/// - Seed logged for reproducibility
/// - All limits explicit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    seed: u64,
    /// Upper bound of the random delay added to each probe (0 = none)
    latency_ms_max: u64,
}

impl SimConfig {
    /// Create config with explicit seed and no simulated latency.
    ///
    /// ```
    /// use mustexist_dst::SimConfig;
    /// let config = SimConfig::with_seed(12345);
    /// assert_eq!(config.seed(), 12345);
    /// assert_eq!(config.latency_ms_max(), 0);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            latency_ms_max: 0,
        }
    }

    /// Create config from the `DST_SEED` env var, or a random seed.
    ///
    /// A random seed is logged so the run can be replayed.
    ///
    /// # Panics
    /// Panics if `DST_SEED` is set but is not a valid u64.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let seed = if let Ok(seed_str) = env::var(DST_SEED_ENV_VAR) {
            seed_str.parse::<u64>().unwrap_or_else(|_| {
                panic!("{DST_SEED_ENV_VAR} must be a valid u64, got: {seed_str}")
            })
        } else {
            let seed = rand::thread_rng().gen::<u64>();
            tracing::info!(seed, "DST: generated random seed (replay with DST_SEED={seed})");
            seed
        };

        Self::with_seed(seed)
    }

    /// Get the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Upper bound of per-probe latency in milliseconds.
    #[must_use]
    pub fn latency_ms_max(&self) -> u64 {
        self.latency_ms_max
    }

    /// Add a random per-probe delay in `[0, latency_ms_max]`.
    ///
    /// # Panics
    /// Panics if the bound exceeds `DST_LATENCY_MS_MAX`.
    #[must_use]
    pub fn with_latency_ms_max(self, latency_ms_max: u64) -> Self {
        assert!(
            latency_ms_max <= DST_LATENCY_MS_MAX,
            "latency_ms_max must be <= {DST_LATENCY_MS_MAX}, got {latency_ms_max}"
        );

        Self {
            latency_ms_max,
            ..self
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_env_or_random()
    }
}
