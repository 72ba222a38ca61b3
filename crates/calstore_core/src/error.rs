//! Error types for store operations.

use std::fmt;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The class of store operation that failed.
///
/// Carried on [`StoreError::Database`] so callers can decide whether a
/// failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// A read or scan.
    Query,
    /// An insert or upsert.
    Insert,
    /// An in-place replacement.
    Update,
    /// A soft delete or tombstone purge.
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::Query => "QUERY",
            StoreOp::Insert => "INSERT",
            StoreOp::Update => "UPDATE",
            StoreOp::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur in calstore operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] calstore_storage::StorageError),

    /// A table snapshot could not be decoded.
    #[error("corrupt table snapshot: {message}")]
    Corrupt {
        /// Description of the corruption.
        message: String,
    },

    /// A table operation failed.
    #[error("{operation} failed on {table}: {message}")]
    Database {
        /// The operation that failed.
        operation: StoreOp,
        /// The table being operated on.
        table: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// An entity failed validation.
    #[error("validation failed for {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl StoreError {
    /// Creates a corrupt-snapshot error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Creates a database operation error.
    pub fn database(operation: StoreOp, table: &'static str, message: impl fmt::Display) -> Self {
        Self::Database {
            operation,
            table,
            message: message.to_string(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_op_display_matches_tags() {
        assert_eq!(StoreOp::Query.to_string(), "QUERY");
        assert_eq!(StoreOp::Insert.to_string(), "INSERT");
        assert_eq!(StoreOp::Update.to_string(), "UPDATE");
        assert_eq!(StoreOp::Delete.to_string(), "DELETE");
    }

    #[test]
    fn database_error_display() {
        let err = StoreError::database(StoreOp::Insert, "events", "disk full");
        assert_eq!(err.to_string(), "INSERT failed on events: disk full");
    }

    #[test]
    fn validation_error_names_field() {
        let err = StoreError::validation("title", "title is required");
        assert!(err.to_string().contains("title"));
    }
}
