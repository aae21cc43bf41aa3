//! Single-Store Validator
//!
//! `TigerStyle`: every probe dispatched before any is awaited, results
//! collected by position.
//!
//! ```text
//! Expectations { byId: [a, b], byProps: [m] }
//!        │
//!        ├── exists_by_id(a) ──┐
//!        ├── exists_by_id(b) ──┼── try_join_all / buffered(n) ── [bool; 3]
//!        └── exists_by_props(m)┘                                   │
//!                                    split at byId.len() ── MissingReport
//! ```

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::config::MustExistConfig;
use crate::error::{AssertionFailure, MustExistError};
use crate::expectation::Expectations;
use crate::report::MissingReport;
use crate::store::{StoreAdapter, StoreError, StoreResult};

/// Probe `adapter` for every expectation and report what is missing.
///
/// The report lists missing entries in input order regardless of which
/// probe finished first. Duplicated expectations are probed and reported
/// once per occurrence.
///
/// # Errors
/// Returns `MustExistError::StoreUnavailable` if any probe fails. A failed
/// probe is never counted as missing.
#[tracing::instrument(
    skip_all,
    fields(
        store = adapter.name(),
        ids = expectations.by_id.len(),
        props = expectations.by_props.len(),
    )
)]
pub async fn missing<A>(
    expectations: &Expectations,
    adapter: &A,
    config: &MustExistConfig,
) -> Result<MissingReport, MustExistError>
where
    A: StoreAdapter + ?Sized,
{
    let id_probes = expectations.by_id.iter().map(|id| {
        async move {
            let found = adapter.exists_by_id(id).await?;
            tracing::debug!(%id, found, "identifier probe");
            Ok::<_, StoreError>(found)
        }
        .boxed()
    });
    let prop_probes = expectations.by_props.iter().map(|matcher| {
        async move {
            let found = adapter.exists_by_props(matcher).await?;
            tracing::debug!(matcher = %matcher.to_json(), found, "property probe");
            Ok::<_, StoreError>(found)
        }
        .boxed()
    });
    let probes: Vec<BoxFuture<'_, StoreResult<bool>>> = id_probes.chain(prop_probes).collect();

    let results: StoreResult<Vec<bool>> = match config.concurrency_limit {
        None => future::try_join_all(probes).await,
        Some(limit) => stream::iter(probes).buffered(limit.get()).try_collect().await,
    };

    let found = results.map_err(|source| {
        tracing::error!(store = adapter.name(), error = %source, "store unavailable");
        MustExistError::store_unavailable(adapter.name(), source)
    })?;

    let (id_found, props_found) = found.split_at(expectations.by_id.len());
    Ok(MissingReport::from_probes(expectations, id_found, props_found))
}

/// Assert that `adapter` holds every expected entry.
///
/// # Errors
/// `MustExistError::MissingEntities` if anything is missing,
/// `MustExistError::StoreUnavailable` if the store could not answer.
pub async fn must_exist<A>(expectations: &Expectations, adapter: &A) -> Result<(), MustExistError>
where
    A: StoreAdapter + ?Sized,
{
    must_exist_with(expectations, adapter, &MustExistConfig::default()).await
}

/// [`must_exist`] with explicit configuration.
///
/// # Errors
/// See [`must_exist`].
pub async fn must_exist_with<A>(
    expectations: &Expectations,
    adapter: &A,
    config: &MustExistConfig,
) -> Result<(), MustExistError>
where
    A: StoreAdapter + ?Sized,
{
    let report = missing(expectations, adapter, config).await?;

    if report.is_empty() {
        tracing::debug!(store = adapter.name(), "all mandatory entries present");
        return Ok(());
    }

    if config.log_missing {
        tracing::warn!(
            store = adapter.name(),
            missing = report.missing_count(),
            report = ?report,
            "missing mandatory entries"
        );
    }

    Err(MustExistError::MissingEntities(AssertionFailure::new(
        adapter.name(),
        report,
    )))
}

// =============================================================================
// TESTS
// =============================================================================
