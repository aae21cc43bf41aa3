//! `SimKeyValueStore` - In-Memory Key-Value Store for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! Models a key-value cache where each record is a JSON string stored under
//! `prefix + id` (e.g. `pers:johnMalcowitch`). Identifier lookups are a key
//! check; property lookups scan the prefix and decode every value. Values
//! that are not JSON objects never match.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mustexist_dst::{FaultConfig, FaultInjector, SimConfig};
use serde_json::Value;

use super::adapter::StoreAdapter;
use super::error::StoreResult;
use super::sim::SimProbe;
use crate::expectation::{EntityId, PropertyMatcher};

/// Key under which the record for `id` lives.
pub(crate) fn record_key(prefix: &str, id: &EntityId) -> String {
    format!("{prefix}{id}")
}

/// Whether a raw stored value is a record matching `matcher`.
pub(crate) fn raw_value_matches(raw: &str, matcher: &PropertyMatcher) -> bool {
    serde_json::from_str::<Value>(raw).is_ok_and(|record| matcher.matches(&record))
}

// =============================================================================
// SimKeyValueStore
// =============================================================================

/// In-memory key-value store.
///
/// `TigerStyle`:
/// - Keys kept sorted so prefix scans are deterministic
/// - Deterministic latency and faults via `SimConfig` seed
/// - Clones share the same entries
#[derive(Debug, Clone)]
pub struct SimKeyValueStore {
    name: String,
    prefix: String,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    probe: SimProbe,
}

impl SimKeyValueStore {
    /// Create an empty store with no key prefix.
    #[must_use]
    pub fn new(name: impl Into<String>, config: SimConfig) -> Self {
        Self::with_probe(name, SimProbe::new(config))
    }

    /// Create an empty store that draws faults from a shared injector.
    #[must_use]
    pub fn with_fault_injector(
        name: impl Into<String>,
        config: SimConfig,
        fault_injector: Arc<FaultInjector>,
    ) -> Self {
        Self::with_probe(name, SimProbe::with_fault_injector(config, fault_injector))
    }

    fn with_probe(name: impl Into<String>, probe: SimProbe) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "store name must not be empty");

        Self {
            name,
            prefix: String::new(),
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            probe,
        }
    }

    /// Only consider keys under `prefix`; ids are looked up as `prefix + id`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Add a fault to this store's injector.
    ///
    /// # Panics
    /// Panics once the store has been cloned or uses a shared injector.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        self.probe.register_fault(config);
        self
    }

    /// Seed a raw value under a full key.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Seed a JSON record under `prefix + id`.
    pub fn set_record(&self, id: impl Into<EntityId>, record: &Value) {
        self.set(record_key(&self.prefix, &id.into()), record.to_string());
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of entries (for testing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probes answered or failed so far.
    #[must_use]
    pub fn probe_count(&self) -> u64 {
        self.probe.probe_count()
    }

    /// Highest number of probes observed in flight at once.
    #[must_use]
    pub fn in_flight_max(&self) -> usize {
        self.probe.in_flight_max()
    }

    /// Fault injector for inspection.
    #[must_use]
    pub fn fault_injector(&self) -> &Arc<FaultInjector> {
        self.probe.faults()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn scan_prefix_matches(&self, matcher: &PropertyMatcher) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .range(self.prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&self.prefix))
            .any(|(_, raw)| raw_value_matches(raw, matcher))
    }
}

#[async_trait]
impl StoreAdapter for SimKeyValueStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(store = %self.name))]
    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        let key = record_key(&self.prefix, id);
        self.probe
            .run("exists_by_id", || self.contains_key(&key))
            .await
    }

    #[tracing::instrument(skip(self, matcher), fields(store = %self.name, fields = matcher.len()))]
    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        self.probe
            .run("exists_by_props", || self.scan_prefix_matches(matcher))
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================
