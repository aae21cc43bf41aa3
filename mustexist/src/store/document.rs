//! `SimDocumentStore` - In-Memory Document Collection for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! Models a document database collection: records are JSON objects, the
//! primary key lives in one field of the document (`id` by default), and
//! property lookups scan the collection.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mustexist_dst::{FaultConfig, FaultInjector, SimConfig};
use serde_json::Value;

use super::adapter::StoreAdapter;
use super::error::StoreResult;
use super::sim::SimProbe;
use crate::constants::DOCUMENT_ID_FIELD_DEFAULT;
use crate::expectation::{EntityId, PropertyMatcher};

// =============================================================================
// SimDocumentStore
// =============================================================================

/// In-memory document collection.
///
/// `TigerStyle`:
/// - Deterministic latency and faults via `SimConfig` seed
/// - Thread-safe with `RwLock`
/// - Clones share the same documents
#[derive(Debug, Clone)]
pub struct SimDocumentStore {
    name: String,
    id_field: String,
    documents: Arc<RwLock<Vec<Value>>>,
    probe: SimProbe,
}

impl SimDocumentStore {
    /// Create an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>, config: SimConfig) -> Self {
        Self::with_probe(name, SimProbe::new(config))
    }

    /// Create an empty collection that draws faults from a shared injector.
    ///
    /// Lets one injector drive several stores in a scenario.
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
            id_field: DOCUMENT_ID_FIELD_DEFAULT.to_string(),
            documents: Arc::new(RwLock::new(Vec::new())),
            probe,
        }
    }

    /// Look identifiers up in `field` instead of `id` (e.g. `_id`).
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
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

    /// Seed a document.
    ///
    /// # Panics
    /// Panics if `document` is not a JSON object.
    pub fn insert(&self, document: Value) {
        assert!(document.is_object(), "document must be a JSON object");

        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(document);
    }

    /// Remove every document.
    pub fn clear(&self) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of documents (for testing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the collection is empty.
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

    fn any_document(&self, predicate: impl Fn(&Value) -> bool) -> bool {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(predicate)
    }
}

#[async_trait]
impl StoreAdapter for SimDocumentStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(store = %self.name))]
    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        let wanted = id.to_json();
        self.probe
            .run("exists_by_id", || {
                self.any_document(|doc| doc.get(&self.id_field) == Some(&wanted))
            })
            .await
    }

    #[tracing::instrument(skip(self, matcher), fields(store = %self.name, fields = matcher.len()))]
    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        self.probe
            .run("exists_by_props", || self.any_document(|doc| matcher.matches(doc)))
            .await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use mustexist_dst::FaultType;
    use serde_json::json;

    fn persons() -> SimDocumentStore {
        let store = SimDocumentStore::new("persons", SimConfig::with_seed(42));
        store.insert(json!({"id": 1, "fname": "John", "lname": "Malcowitch"}));
        store.insert(json!({"id": "jane", "fname": "Jane", "lname": "Doe"}));
        store
    }

    #[tokio::test]
    async fn test_exists_by_id() {
        let store = persons();

        assert!(store.exists_by_id(&EntityId::from(1)).await.unwrap());
        assert!(store.exists_by_id(&EntityId::from("jane")).await.unwrap());
        assert!(!store.exists_by_id(&EntityId::from(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_id_distinguishes_json_types() {
        let store = persons();
        assert!(!store.exists_by_id(&EntityId::from("1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_id_field() {
        let store = SimDocumentStore::new("mongo", SimConfig::with_seed(1)).with_id_field("_id");
        store.insert(json!({"_id": "abc"}));

        assert!(store.exists_by_id(&EntityId::from("abc")).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_props() {
        let store = persons();

        let found = PropertyMatcher::new().with("lname", "Malcowitch");
        let partial = PropertyMatcher::new().with("lname", "Malco");
        let mixed = PropertyMatcher::new()
            .with("fname", "Jane")
            .with("lname", "Malcowitch");

        assert!(store.exists_by_props(&found).await.unwrap());
        assert!(!store.exists_by_props(&partial).await.unwrap());
        assert!(!store.exists_by_props(&mixed).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = SimDocumentStore::new("empty", SimConfig::with_seed(42));

        assert!(store.is_empty());
        assert!(!store.exists_by_id(&EntityId::from(1)).await.unwrap());
        assert!(!store.exists_by_props(&PropertyMatcher::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store = SimDocumentStore::new("shared", SimConfig::with_seed(3));
        let clone = store.clone();
        clone.insert(json!({"id": 9}));

        assert_eq!(store.len(), 1);
        store.clear();
        assert!(clone.is_empty());
    }

    #[tokio::test]
    async fn test_fault_is_not_reported_as_missing() {
        let store = persons().with_faults(FaultConfig::new(FaultType::ConnectionRefused, 1.0));

        let err = store.exists_by_id(&EntityId::from(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::SimulatedFault {
                fault_type: FaultType::ConnectionRefused,
                ..
            }
        ));
        assert_eq!(store.fault_injector().total_injections(), 1);
    }

    #[tokio::test]
    async fn test_fault_filter_targets_one_lookup_kind() {
        let store = persons()
            .with_faults(FaultConfig::new(FaultType::ProbeTimeout, 1.0).with_filter("by_props"));

        assert!(store.exists_by_id(&EntityId::from(1)).await.unwrap());
        assert!(store
            .exists_by_props(&PropertyMatcher::new().with("fname", "John"))
            .await
            .is_err());
        assert_eq!(store.probe_count(), 2);
    }

    #[test]
    #[should_panic(expected = "document must be a JSON object")]
    fn test_insert_rejects_non_objects() {
        SimDocumentStore::new("x", SimConfig::with_seed(1)).insert(json!([1, 2]));
    }
}
