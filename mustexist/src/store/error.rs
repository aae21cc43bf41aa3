//! Store Errors
//!
//! `TigerStyle`: Explicit error types with context.
//!
//! Every variant means the store could not answer. The engine turns any of
//! them into `MustExistError::StoreUnavailable`.

use mustexist_dst::FaultType;
use thiserror::Error;

/// Errors from store existence queries.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("connection error: {message}")]
    Connection {
        /// Connection error message
        message: String,
    },

    /// Store was reached but the query failed
    #[error("query error: {message}")]
    Query {
        /// Query error message
        message: String,
    },

    /// Query did not complete in time
    #[error("timeout during {operation}")]
    Timeout {
        /// Operation that timed out
        operation: String,
    },

    /// Store answered with data the adapter could not decode
    #[error("decode error: {message}")]
    Decode {
        /// Decode error message
        message: String,
    },

    /// Adapter was configured with values the store cannot accept
    #[error("invalid store configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },

    /// Simulated fault (for DST)
    #[error("simulated fault: {fault_type} during {operation}")]
    SimulatedFault {
        /// Type of simulated fault
        fault_type: FaultType,
        /// Operation the fault was injected into
        operation: String,
    },
}

impl StoreError {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a simulated fault error.
    #[must_use]
    pub fn simulated_fault(fault_type: FaultType, operation: impl Into<String>) -> Self {
        Self::SimulatedFault {
            fault_type,
            operation: operation.into(),
        }
    }

    /// Whether the store itself was unreachable (as opposed to a failed query).
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::SimulatedFault { fault_type, .. } => fault_type.is_connectivity(),
            _ => false,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
