//! # Mustexist
//!
//! Assert that the fixture records an end-to-end suite depends on are
//! present in every backing store before the suite runs.
//!
//! ## Quick Start
//!
//! ```rust
//! use mustexist::{must_exist, Expectations, PropertyMatcher, SimDocumentStore, SimConfig};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let persons = SimDocumentStore::new("persons", SimConfig::with_seed(42));
//! persons.insert(json!({ "id": 1, "fname": "John", "lname": "Malcowitch" }));
//!
//! let expectations = Expectations::new()
//!     .with_id(1)
//!     .with_props(PropertyMatcher::new().with("lname", "Malcowitch"));
//!
//! must_exist(&expectations, &persons).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Expectations { byId, byProps }                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  must_exist_all  ── fans out per store, waits for all    │
//! │  must_exist      ── fans out per probe, keeps order      │
//! ├──────────────────────────────────────────────────────────┤
//! │  StoreAdapter: SimDocumentStore │ SimKeyValueStore       │
//! │                PostgresDocumentStore │ RedisKeyValueStore│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure surface
//!
//! Every [`MustExistError`] that reports missing data renders as one
//! free-text header line followed by a JSON block. An outer harness can
//! recover the structure with [`FailurePayload::parse`].
//!
//! ## Feature Flags
//!
//! - `postgres` - document store backed by a Postgres JSONB table (sqlx)
//! - `redis` - key-value store backed by Redis
//! - `all-stores` - both of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod expectation;
pub mod orchestrator;
pub mod report;
pub mod store;
pub mod telemetry;
pub mod validator;

pub use config::{ConfigError, MustExistConfig};
pub use error::{AggregateFailure, AssertionFailure, FailurePayload, MustExistError, PayloadError};
pub use expectation::{EntityId, ExpectationError, Expectations, PropertyMatcher};
pub use orchestrator::{must_exist_all, must_exist_all_with, MustExist, MustExistBuilder};
pub use report::{MissingReport, StoreOutcome};
pub use store::{SimDocumentStore, SimKeyValueStore, StoreAdapter, StoreError, StoreResult};
pub use validator::{missing, must_exist, must_exist_with};

pub use mustexist_dst::{FaultConfig, FaultType, SimConfig};

#[cfg(feature = "postgres")]
pub use store::PostgresDocumentStore;

#[cfg(feature = "redis")]
pub use store::RedisKeyValueStore;
