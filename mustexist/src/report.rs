//! Reports - what a validation run found missing
//!
//! A `MissingReport` mirrors `Expectations` but only holds the entries a
//! store could not find, cloned verbatim and in input order.

use serde::{Deserialize, Serialize};

use crate::expectation::{EntityId, Expectations, PropertyMatcher};

/// Subset of an expectation set that a store could not find.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingReport {
    /// Identifiers not found, in input order
    pub by_id: Vec<EntityId>,
    /// Matchers not found, in input order
    pub by_props: Vec<PropertyMatcher>,
}

impl MissingReport {
    /// The empty report: the invariant every assertion checks against.
    #[must_use]
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Build a report from probe results.
    ///
    /// `id_found[i]` answers `expectations.by_id[i]`, and likewise for
    /// `props_found`. Entries whose probe answered `false` are kept.
    ///
    /// # Panics
    /// Panics if a result slice does not line up with its expectations.
    #[must_use]
    pub fn from_probes(expectations: &Expectations, id_found: &[bool], props_found: &[bool]) -> Self {
        assert_eq!(
            expectations.by_id.len(),
            id_found.len(),
            "one result per identifier"
        );
        assert_eq!(
            expectations.by_props.len(),
            props_found.len(),
            "one result per matcher"
        );

        Self {
            by_id: keep_missing(&expectations.by_id, id_found),
            by_props: keep_missing(&expectations.by_props, props_found),
        }
    }

    /// Whether nothing is missing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_props.is_empty()
    }

    /// Number of missing entries across both lookups.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.by_id.len() + self.by_props.len()
    }
}

fn keep_missing<T: Clone>(expected: &[T], found: &[bool]) -> Vec<T> {
    expected
        .iter()
        .zip(found)
        .filter(|(_, found)| !**found)
        .map(|(entry, _)| entry.clone())
        .collect()
}

/// One store's expected/actual pair from a validation run.
///
/// The store name travels with the typed value and the rendered header;
/// it is not part of the serialized block, which is exactly
/// `{expected, actual}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    /// Name of the store that produced this outcome
    #[serde(skip)]
    pub store: String,
    /// Always the baseline report
    pub expected: MissingReport,
    /// What the store was missing
    pub actual: MissingReport,
}

impl StoreOutcome {
    /// Outcome for `store` with the given missing entries.
    #[must_use]
    pub fn new(store: impl Into<String>, actual: MissingReport) -> Self {
        Self {
            store: store.into(),
            expected: MissingReport::baseline(),
            actual,
        }
    }

    /// Whether the store satisfied every expectation.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.actual == self.expected
    }
}
