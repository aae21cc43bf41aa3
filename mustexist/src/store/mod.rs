//! Store - Adapter Trait and Implementations
//!
//! `TigerStyle`: one existence-query interface, simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StoreAdapter Trait                        │
//! │        exists_by_id(id)   exists_by_props(matcher)           │
//! └─────────────────────────────────────────────────────────────┘
//!        ↑                ↑                 ↑                ↑
//! ┌──────┴───────┐ ┌──────┴───────┐ ┌───────┴──────┐ ┌───────┴──────┐
//! │SimDocument   │ │SimKeyValue   │ │Postgres      │ │Redis         │
//! │Store (tests) │ │Store (tests) │ │DocumentStore │ │KeyValueStore │
//! └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! Adapters are handed over already connected. None of them writes to,
//! creates, or migrates anything in the underlying store.

mod adapter;
mod document;
mod error;
mod keyvalue;
mod sim;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis_kv;

pub use adapter::StoreAdapter;
pub use document::SimDocumentStore;
pub use error::{StoreError, StoreResult};
pub use keyvalue::SimKeyValueStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;

#[cfg(feature = "redis")]
pub use redis_kv::RedisKeyValueStore;
