//! `TigerStyle` Constants
//!
//! Big-endian naming with units: `CATEGORY_SPECIFICS_UNIT_LIMIT`.

// =============================================================================
// Failure Messages
// =============================================================================

/// Message carried by a single-store assertion failure.
pub const MISSING_ENTRIES_MESSAGE: &str = "mustExist assertion - missing mandatory entries in db";

/// Message carried by the multi-store aggregate failure.
pub const SETUP_FAILED_MESSAGE: &str = "one or more stores setup failed";

// =============================================================================
// Configuration
// =============================================================================

/// Environment variable bounding in-flight probes per store
pub const CONCURRENCY_ENV_VAR: &str = "MUSTEXIST_CONCURRENCY";

/// Environment variable overriding the tracing filter
pub const LOG_FILTER_ENV_VAR: &str = "RUST_LOG";

/// Default tracing filter directive
pub const LOG_FILTER_DEFAULT: &str = "mustexist=info";

// =============================================================================
// Store Limits
// =============================================================================

/// Default field holding a document's identifier
pub const DOCUMENT_ID_FIELD_DEFAULT: &str = "id";

/// Maximum length of a SQL identifier part (Postgres NAMEDATALEN - 1)
pub const SQL_IDENTIFIER_BYTES_MAX: usize = 63;

/// Maximum connections opened by `PostgresDocumentStore::connect`
pub const POSTGRES_POOL_CONNECTIONS_MAX: u32 = 5;

/// Keys requested per Redis SCAN round-trip
pub const REDIS_SCAN_COUNT_DEFAULT: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        assert!(!MISSING_ENTRIES_MESSAGE.contains('\n'));
        assert!(!SETUP_FAILED_MESSAGE.contains('\n'));
    }

    #[test]
    fn test_store_limits_valid() {
        assert!(SQL_IDENTIFIER_BYTES_MAX > 0);
        assert!(POSTGRES_POOL_CONNECTIONS_MAX > 0);
        assert!(REDIS_SCAN_COUNT_DEFAULT > 0);
    }
}
