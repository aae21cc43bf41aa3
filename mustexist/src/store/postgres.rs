//! `PostgresDocumentStore` - Document Collection in a JSONB Table
//!
//! `TigerStyle`: Real database lookups, read-only, proper error mapping.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PostgresDocumentStore                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pool: sqlx::PgPool (shared with the seeding collaborator)   │
//! │  Table: <collection> (id JSONB PRIMARY KEY, doc JSONB)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Expected schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS persons (
//!     id  JSONB PRIMARY KEY,
//!     doc JSONB NOT NULL
//! );
//! CREATE INDEX IF NOT EXISTS idx_persons_doc ON persons USING GIN(doc);
//! ```
//!
//! The table is created by whoever seeds it; this adapter only reads.
//! Identifiers are stored as JSONB so `1` and `"1"` stay distinct keys.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use super::adapter::StoreAdapter;
use super::error::{StoreError, StoreResult};
use crate::constants::{POSTGRES_POOL_CONNECTIONS_MAX, SQL_IDENTIFIER_BYTES_MAX};
use crate::expectation::{EntityId, PropertyMatcher};

// =============================================================================
// PostgresDocumentStore
// =============================================================================

/// Document collection stored as a Postgres JSONB table.
#[derive(Clone, Debug)]
pub struct PostgresDocumentStore {
    name: String,
    table: String,
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Connect a small pool and wrap `table`.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidConfig` for a bad table name and
    /// `StoreError::Connection` if the pool cannot connect.
    ///
    /// # Example
    /// ```ignore
    /// let persons = PostgresDocumentStore::connect("postgres", "postgres://localhost/e2e", "persons").await?;
    /// ```
    pub async fn connect(
        name: impl Into<String>,
        connection_string: &str,
        table: &str,
    ) -> StoreResult<Self> {
        if !(connection_string.starts_with("postgres://")
            || connection_string.starts_with("postgresql://"))
        {
            return Err(StoreError::invalid_config(
                "connection string must be a postgres URL",
            ));
        }
        validate_table_name(table)?;

        let pool = PgPoolOptions::new()
            .max_connections(POSTGRES_POOL_CONNECTIONS_MAX)
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::connection(format!("failed to connect: {e}")))?;

        Self::from_pool(name, pool, table)
    }

    /// Wrap an existing pool.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidConfig` for a bad table name.
    pub fn from_pool(name: impl Into<String>, pool: PgPool, table: &str) -> StoreResult<Self> {
        validate_table_name(table)?;

        Ok(Self {
            name: name.into(),
            table: table.to_string(),
            pool,
        })
    }

    /// Get the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Table this store reads from.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Accept `table` or `schema.table`, each part a plain SQL identifier.
///
/// The table name is interpolated into queries, so anything else is refused.
fn validate_table_name(table: &str) -> StoreResult<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        part.len() <= SQL_IDENTIFIER_BYTES_MAX
            && chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|part| valid_part(part)) {
        Ok(())
    } else {
        Err(StoreError::invalid_config(format!(
            "invalid table name: {table:?}"
        )))
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::connection(err.to_string()),
        sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
            StoreError::decode(err.to_string())
        }
        other => StoreError::query(other.to_string()),
    }
}

fn exists_by_id_sql(table: &str) -> String {
    format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)")
}

/// One `(doc -> $n) = $m` term per field; an empty matcher matches any row.
fn exists_by_props_query(table: &str, matcher: &PropertyMatcher) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
    query.push(table);
    query.push(" WHERE TRUE");

    for (field, value) in matcher.iter() {
        query.push(" AND (doc -> ");
        query.push_bind(field.clone());
        query.push(") = ");
        query.push_bind(Json(value.clone()));
    }
    query.push(")");
    query
}

#[async_trait]
impl StoreAdapter for PostgresDocumentStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(store = %self.name, table = %self.table))]
    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        let sql = exists_by_id_sql(&self.table);

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(Json(id.to_json()))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    #[tracing::instrument(skip(self, matcher), fields(store = %self.name, table = %self.table))]
    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        let mut query = exists_by_props_query(&self.table, matcher);

        query
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
