//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// The store path is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The store directory is missing and creation was not requested.
    #[error("store directory does not exist: {path}")]
    Missing {
        /// The missing path.
        path: PathBuf,
    },
}
