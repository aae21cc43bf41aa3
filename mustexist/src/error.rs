//! Errors - typed failures with a parseable text surface
//!
//! `TigerStyle`: explicit error types with context.
//!
//! Failures that report missing data render as:
//!
//! ```text
//! MustExist: store 'persons' is missing 1 mandatory entries
//! {
//!   "message": "mustExist assertion - missing mandatory entries in db",
//!   "expected": { "byId": [], "byProps": [] },
//!   "actual": { "byId": [1], "byProps": [] }
//! }
//! ```
//!
//! The header is free text. Everything after the first newline is one JSON
//! document in either the single-store or the aggregate shape, and
//! [`FailurePayload::parse`] recovers it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{MISSING_ENTRIES_MESSAGE, SETUP_FAILED_MESSAGE};
use crate::report::{MissingReport, StoreOutcome};
use crate::store::StoreError;

// =============================================================================
// Payloads
// =============================================================================

/// Single-store failure: `{ message, expected, actual }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Store that failed (header only, not serialized)
    #[serde(skip)]
    pub store: String,
    /// Always `MISSING_ENTRIES_MESSAGE` when produced by the validator
    pub message: String,
    /// Always the baseline report
    pub expected: MissingReport,
    /// What the store was missing
    pub actual: MissingReport,
}

impl AssertionFailure {
    /// Failure for `store` missing the entries in `actual`.
    #[must_use]
    pub fn new(store: impl Into<String>, actual: MissingReport) -> Self {
        Self {
            store: store.into(),
            message: MISSING_ENTRIES_MESSAGE.to_string(),
            expected: MissingReport::baseline(),
            actual,
        }
    }

    fn header(&self) -> String {
        let count = self.actual.missing_count();
        if self.store.is_empty() {
            format!("MustExist: store is missing {count} mandatory entries")
        } else {
            format!(
                "MustExist: store '{}' is missing {count} mandatory entries",
                self.store
            )
        }
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.header(), self)
    }
}

/// Multi-store failure: `{ message, errors: [{ expected, actual }, ...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFailure {
    /// Always `SETUP_FAILED_MESSAGE` when produced by the orchestrator
    pub message: String,
    /// One outcome per failing store, in adapter declaration order
    pub errors: Vec<StoreOutcome>,
}

impl AggregateFailure {
    /// Aggregate the outcomes of every failing store.
    #[must_use]
    pub fn new(errors: Vec<StoreOutcome>) -> Self {
        Self {
            message: SETUP_FAILED_MESSAGE.to_string(),
            errors,
        }
    }

    /// Names of the failing stores, in declaration order.
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|outcome| outcome.store.as_str())
    }

    fn header(&self) -> String {
        let names: Vec<&str> = self.stores().filter(|name| !name.is_empty()).collect();
        if names.is_empty() {
            format!(
                "MustExist: {} stores are missing mandatory entries",
                self.errors.len()
            )
        } else {
            format!(
                "MustExist: {} stores are missing mandatory entries ({})",
                self.errors.len(),
                names.join(", ")
            )
        }
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.header(), self)
    }
}

fn render<T: Serialize>(f: &mut fmt::Formatter<'_>, header: &str, payload: &T) -> fmt::Result {
    let block = serde_json::to_string_pretty(payload).map_err(|_| fmt::Error)?;
    // Header must stay on one line; the block starts after the first newline.
    write!(f, "{}\n{block}", header.replace('\n', " "))
}

// =============================================================================
// FailurePayload
// =============================================================================

/// Errors recovering a payload from rendered error text.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The text has no line after the header
    #[error("error text has no structured block after the header line")]
    MissingBlock,

    /// The block is not a failure payload
    #[error("invalid failure payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Either payload shape, as recovered from text or taken from an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailurePayload {
    /// Multi-store shape (`errors` present)
    Aggregate(AggregateFailure),
    /// Single-store shape (`expected`/`actual` at top level)
    Single(AssertionFailure),
}

impl FailurePayload {
    /// Parse rendered error text: drop the header line, parse the rest.
    ///
    /// # Errors
    /// `PayloadError::MissingBlock` if there is no second line,
    /// `PayloadError::Json` if the block is not one of the two shapes.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let (_, block) = text.split_once('\n').ok_or(PayloadError::MissingBlock)?;
        Ok(serde_json::from_str(block)?)
    }

    /// The payload's `message` field.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Aggregate(failure) => &failure.message,
            Self::Single(failure) => &failure.message,
        }
    }
}

// =============================================================================
// MustExistError
// =============================================================================

/// Errors raised by an existence check.
#[derive(Debug, Error)]
pub enum MustExistError {
    /// One store is missing entries (single-store entry point)
    #[error("{0}")]
    MissingEntities(AssertionFailure),

    /// A store could not answer a probe; fatal, never folded into a report
    #[error("MustExist: store '{store}' unavailable: {source}")]
    StoreUnavailable {
        /// Store that failed
        store: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// One or more stores are missing entries (multi-store entry point)
    #[error("{0}")]
    SetupFailed(AggregateFailure),
}

impl MustExistError {
    /// Wrap a store error raised while probing `store`.
    #[must_use]
    pub fn store_unavailable(store: impl Into<String>, source: StoreError) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            source,
        }
    }

    /// The structured payload, if this failure reports missing data.
    #[must_use]
    pub fn payload(&self) -> Option<FailurePayload> {
        match self {
            Self::MissingEntities(failure) => Some(FailurePayload::Single(failure.clone())),
            Self::SetupFailed(failure) => Some(FailurePayload::Aggregate(failure.clone())),
            Self::StoreUnavailable { .. } => None,
        }
    }

    /// The payload as JSON, exactly as it appears in the rendered block.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        self.payload()
            .and_then(|payload| serde_json::to_value(payload).ok())
    }

    /// Whether a store was unreachable.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
