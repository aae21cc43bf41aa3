//! `SimProbe` - shared fault/latency harness for the in-memory stores
//!
//! `TigerStyle`: every simulated probe passes through the same gate, so
//! latency and faults are deterministic for a given seed.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mustexist_dst::{DeterministicRng, FaultConfig, FaultInjector, SimConfig};

use super::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct ProbeStats {
    probes: AtomicU64,
    in_flight: AtomicUsize,
    in_flight_max: AtomicUsize,
}

/// Tracks one in-flight probe; decrements on drop so a cancelled probe
/// is still accounted for.
struct InFlight<'a>(&'a ProbeStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a ProbeStats) -> Self {
        stats.probes.fetch_add(1, Ordering::Relaxed);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.in_flight_max.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Gate every simulated probe goes through.
#[derive(Debug, Clone)]
pub(crate) struct SimProbe {
    faults: Arc<FaultInjector>,
    latency_rng: Arc<Mutex<DeterministicRng>>,
    latency_ms_max: u64,
    stats: Arc<ProbeStats>,
}

impl SimProbe {
    pub(crate) fn new(config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        let fault_rng = rng.fork();
        Self::build(config, rng, Arc::new(FaultInjector::new(fault_rng)))
    }

    pub(crate) fn with_fault_injector(config: SimConfig, faults: Arc<FaultInjector>) -> Self {
        Self::build(config, DeterministicRng::new(config.seed()), faults)
    }

    fn build(config: SimConfig, latency_rng: DeterministicRng, faults: Arc<FaultInjector>) -> Self {
        Self {
            faults,
            latency_rng: Arc::new(Mutex::new(latency_rng)),
            latency_ms_max: config.latency_ms_max(),
            stats: Arc::new(ProbeStats::default()),
        }
    }

    /// Register a fault on the store's private injector.
    ///
    /// # Panics
    /// Panics if the injector is shared (store cloned, or built with
    /// an external injector).
    pub(crate) fn register_fault(&mut self, config: FaultConfig) {
        let Some(injector) = Arc::get_mut(&mut self.faults) else {
            panic!("cannot add faults after the fault injector is shared");
        };
        injector.register(config);
    }

    pub(crate) fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }

    pub(crate) fn probe_count(&self) -> u64 {
        self.stats.probes.load(Ordering::Relaxed)
    }

    pub(crate) fn in_flight_max(&self) -> usize {
        self.stats.in_flight_max.load(Ordering::SeqCst)
    }

    fn next_delay_ms(&self) -> u64 {
        if self.latency_ms_max == 0 {
            return 0;
        }
        self.latency_rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64_in(1, self.latency_ms_max)
    }

    /// Run `lookup` after the simulated round-trip delay, unless a fault fires.
    pub(crate) async fn run<F>(&self, operation: &'static str, lookup: F) -> StoreResult<bool>
    where
        F: FnOnce() -> bool,
    {
        let _in_flight = InFlight::enter(&self.stats);

        let delay_ms = self.next_delay_ms();
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if let Some(fault_type) = self.faults.should_inject(operation) {
            return Err(StoreError::simulated_fault(fault_type, operation));
        }

        Ok(lookup())
    }
}
