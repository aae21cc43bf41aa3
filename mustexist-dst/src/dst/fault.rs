//! FaultInjector - Probabilistic Fault Injection
//!
//! TigerStyle: explicit fault injection for store probes.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Types of faults a simulated store can raise while answering a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// Store refused the TCP connection
    ConnectionRefused,
    /// Connection dropped mid-query
    ConnectionReset,
    /// Connection pool had no free connection
    PoolExhausted,
    /// Query did not answer in time
    ProbeTimeout,
    /// Query reached the store but failed there
    ProbeReadFail,
    /// Store answered with bytes the driver could not decode
    DecodeFail,
}

impl FaultType {
    /// Get the fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => "connection_refused",
            Self::ConnectionReset => "connection_reset",
            Self::PoolExhausted => "pool_exhausted",
            Self::ProbeTimeout => "probe_timeout",
            Self::ProbeReadFail => "probe_read_fail",
            Self::DecodeFail => "decode_fail",
        }
    }

    /// Whether the fault means the store could not be reached at all.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused | Self::ConnectionReset | Self::PoolExhausted
        )
    }

    /// All fault types in declaration order.
    #[must_use]
    pub fn all() -> &'static [FaultType] {
        &[
            Self::ConnectionRefused,
            Self::ConnectionReset,
            Self::PoolExhausted,
            Self::ProbeTimeout,
            Self::ProbeReadFail,
            Self::DecodeFail,
        ]
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a specific fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {DST_FAULT_PROBABILITY_MAX}], got {probability}"
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Only inject on operations whose name contains `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set maximum number of injections.
    ///
    /// # Panics
    /// Panics if `max` is zero.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }

    fn applies_to(&self, operation: &str) -> bool {
        self.operation_filter
            .as_deref()
            .map_or(true, |filter| operation.contains(filter))
    }
}

#[derive(Debug)]
struct InjectorState {
    rng: DeterministicRng,
    injection_counts: HashMap<FaultType, u64>,
}

/// Fault injector for simulated stores.
///
/// TigerStyle:
/// - Faults are registered before the injector is shared
/// - Deterministic through RNG
/// - Interior mutability so it can be shared via `Arc`
#[derive(Debug)]
pub struct FaultInjector {
    configs: Vec<FaultConfig>,
    state: Mutex<InjectorState>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG and no faults.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            configs: Vec::new(),
            state: Mutex::new(InjectorState {
                rng,
                injection_counts: HashMap::new(),
            }),
        }
    }

    /// Register a fault configuration.
    ///
    /// Registration must happen before sharing via `Arc`.
    pub fn register(&mut self, config: FaultConfig) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .injection_counts
            .entry(config.fault_type)
            .or_insert(0);
        self.configs.push(config);
    }

    /// Whether any fault is registered.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        !self.configs.is_empty()
    }

    /// Check if a fault should be injected for the given operation.
    ///
    /// The first registered fault that matches and wins its roll is
    /// returned. Rolls are only consumed for matching configs, so probes
    /// against an unfiltered operation do not shift the sequence seen by
    /// others.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        if self.configs.is_empty() {
            return None;
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        for config in &self.configs {
            if !config.applies_to(operation) {
                continue;
            }

            let count = state
                .injection_counts
                .get(&config.fault_type)
                .copied()
                .unwrap_or(0);
            if config.max_injections.is_some_and(|max| count >= max) {
                continue;
            }

            if state.rng.next_bool(config.probability) {
                *state.injection_counts.entry(config.fault_type).or_insert(0) += 1;
                tracing::debug!(
                    fault = config.fault_type.as_str(),
                    operation,
                    "injecting simulated fault"
                );
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Injection counts keyed by fault name.
    #[must_use]
    pub fn injection_stats(&self) -> HashMap<String, u64> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .injection_counts
            .iter()
            .map(|(fault_type, count)| (fault_type.as_str().to_string(), *count))
            .collect()
    }

    /// Get total number of injections.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .injection_counts
            .values()
            .sum()
    }

    /// Reset all statistics.
    pub fn reset_stats(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for count in state.injection_counts.values_mut() {
            *count = 0;
        }
    }
}

/// Builder for `FaultInjector`.
///
/// Configures everything up front so the injector can be shared via `Arc`.
#[derive(Debug)]
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    configs: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            configs: Vec::new(),
        }
    }

    /// Add a fault configuration.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add the faults that make a store unreachable.
    #[must_use]
    pub fn with_connectivity_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::ConnectionRefused, probability))
            .with_fault(FaultConfig::new(FaultType::ConnectionReset, probability))
    }

    /// Add the faults a reachable store can still raise mid-query.
    #[must_use]
    pub fn with_query_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::ProbeTimeout, probability))
            .with_fault(FaultConfig::new(FaultType::ProbeReadFail, probability))
    }

    /// Build the `FaultInjector`.
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let mut injector = FaultInjector::new(self.rng);
        for config in self.configs {
            injector.register(config);
        }
        injector
    }
}
