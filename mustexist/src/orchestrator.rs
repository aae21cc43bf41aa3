//! Multi-Store Orchestrator
//!
//! `TigerStyle`: every store checked, every store awaited, outcomes in
//! declaration order.
//!
//! A suite usually seeds several backends (a document database and a cache,
//! say) and wants one verdict. Each store is validated concurrently with the
//! same expectations; nothing short-circuits, so a slow store is still
//! reported alongside a fast failing one.

use std::fmt;

use futures::future;

use crate::config::{ConfigError, MustExistConfig};
use crate::error::{AggregateFailure, MustExistError};
use crate::expectation::Expectations;
use crate::report::StoreOutcome;
use crate::store::StoreAdapter;
use crate::validator::{missing, must_exist_with};

/// Assert that every store in `adapters` holds every expected entry.
///
/// Pass heterogeneous stores as `&[Box<dyn StoreAdapter>]` or
/// `&[&dyn StoreAdapter]`. No stores means nothing to check.
///
/// # Errors
/// - `MustExistError::StoreUnavailable` for the first unreachable store in
///   declaration order, even if other stores are missing entries
/// - `MustExistError::SetupFailed` listing every store with missing entries
pub async fn must_exist_all<A>(expectations: &Expectations, adapters: &[A]) -> Result<(), MustExistError>
where
    A: StoreAdapter,
{
    must_exist_all_with(expectations, adapters, &MustExistConfig::default()).await
}

/// [`must_exist_all`] with explicit configuration.
///
/// # Errors
/// See [`must_exist_all`].
#[tracing::instrument(skip_all, fields(stores = adapters.len(), probes = expectations.len()))]
pub async fn must_exist_all_with<A>(
    expectations: &Expectations,
    adapters: &[A],
    config: &MustExistConfig,
) -> Result<(), MustExistError>
where
    A: StoreAdapter,
{
    let settled = future::join_all(adapters.iter().map(|adapter| async move {
        let result = missing(expectations, adapter, config).await;
        (adapter.name(), result)
    }))
    .await;

    let mut errors = Vec::new();
    for (store, result) in settled {
        let report = result?;
        if report.is_empty() {
            continue;
        }
        if config.log_missing {
            tracing::warn!(
                store,
                missing = report.missing_count(),
                report = ?report,
                "missing mandatory entries"
            );
        }
        errors.push(StoreOutcome::new(store, report));
    }

    if errors.is_empty() {
        tracing::debug!("all stores hold their mandatory entries");
        return Ok(());
    }

    Err(MustExistError::SetupFailed(AggregateFailure::new(errors)))
}

// =============================================================================
// MustExist
// =============================================================================

/// Reusable guard over a fixed set of stores.
///
/// # Example
///
/// ```rust
/// use mustexist::{Expectations, MustExist, SimConfig, SimDocumentStore, SimKeyValueStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = MustExist::builder()
///     .with_store(SimDocumentStore::new("mongo", SimConfig::with_seed(1)))
///     .with_store(SimKeyValueStore::new("redis", SimConfig::with_seed(2)))
///     .build()?;
///
/// guard.check(&Expectations::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct MustExist {
    stores: Vec<Box<dyn StoreAdapter>>,
    config: MustExistConfig,
}

impl fmt::Debug for MustExist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MustExist")
            .field("stores", &self.store_names().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl MustExist {
    /// Start building a guard.
    #[must_use]
    pub fn builder() -> MustExistBuilder {
        MustExistBuilder::new()
    }

    /// Registered store names, in declaration order.
    pub fn store_names(&self) -> impl Iterator<Item = &str> {
        self.stores.iter().map(|store| store.name())
    }

    /// Configuration applied to every check.
    #[must_use]
    pub fn config(&self) -> &MustExistConfig {
        &self.config
    }

    /// Check every store.
    ///
    /// A guard over exactly one store fails with the single-store payload
    /// (`MissingEntities`); otherwise failures are aggregated.
    ///
    /// # Errors
    /// See [`must_exist_with`] and [`must_exist_all`].
    pub async fn check(&self, expectations: &Expectations) -> Result<(), MustExistError> {
        match self.stores.as_slice() {
            [store] => must_exist_with(expectations, store.as_ref(), &self.config).await,
            stores => must_exist_all_with(expectations, stores, &self.config).await,
        }
    }

    /// Check every store, always reporting the aggregate payload.
    ///
    /// # Errors
    /// See [`must_exist_all`].
    pub async fn check_all(&self, expectations: &Expectations) -> Result<(), MustExistError> {
        must_exist_all_with(expectations, &self.stores, &self.config).await
    }
}

// =============================================================================
// MustExistBuilder
// =============================================================================

/// Builder for [`MustExist`].
///
/// `TigerStyle`:
/// - Fluent API with method chaining
/// - Stores checked in the order they are added
/// - `build()` fails if no store was added
#[derive(Default)]
pub struct MustExistBuilder {
    stores: Vec<Box<dyn StoreAdapter>>,
    config: MustExistConfig,
}

impl MustExistBuilder {
    /// Create a builder with no stores and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a store.
    #[must_use]
    pub fn with_store(self, store: impl StoreAdapter + 'static) -> Self {
        self.with_boxed_store(Box::new(store))
    }

    /// Add an already boxed store.
    #[must_use]
    pub fn with_boxed_store(mut self, store: Box<dyn StoreAdapter>) -> Self {
        self.stores.push(store);
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: MustExistConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the guard.
    ///
    /// # Errors
    /// Returns `ConfigError::NoStores` if no store was added.
    pub fn build(self) -> Result<MustExist, ConfigError> {
        if self.stores.is_empty() {
            return Err(ConfigError::NoStores);
        }

        Ok(MustExist {
            stores: self.stores,
            config: self.config,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
