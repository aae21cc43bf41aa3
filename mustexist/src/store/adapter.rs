//! Store Adapter Trait
//!
//! `TigerStyle`: abstract interface for existence queries.
//!
//! # Simulation-First
//!
//! Engine tests run against `SimDocumentStore` and `SimKeyValueStore`.
//! All implementations must satisfy the same trait contract.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::StoreResult;
use crate::expectation::{EntityId, PropertyMatcher};

/// Uniform existence query over one backing store.
///
/// `Ok(false)` means the store answered and holds no such record. Any
/// `Err` means the store could not answer; callers must not read it as
/// "not found".
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Identifier used in logs and failure headers.
    fn name(&self) -> &str;

    /// Exact-match lookup on the store's primary key space.
    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool>;

    /// Whether at least one record carries every field/value of `matcher`.
    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool>;
}

#[async_trait]
impl<T: StoreAdapter + ?Sized> StoreAdapter for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        (**self).exists_by_props(matcher).await
    }
}

#[async_trait]
impl<T: StoreAdapter + ?Sized> StoreAdapter for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        (**self).exists_by_props(matcher).await
    }
}

#[async_trait]
impl<T: StoreAdapter + ?Sized> StoreAdapter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        (**self).exists_by_props(matcher).await
    }
}
