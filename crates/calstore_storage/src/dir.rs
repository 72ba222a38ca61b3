//! Store directory management.
//!
//! This module handles the file system layout for a calstore directory:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK              # Advisory lock for single-process access
//! ├─ events.tbl        # Events table snapshot
//! └─ calendars.tbl     # Calendars table snapshot
//! ```
//!
//! The LOCK file ensures only one process can open the store at a time.

use crate::error::{StorageError, StorageResult};
use crate::file::FileBackend;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const TABLE_EXT: &str = "tbl";

/// Manages the store directory structure and file locking.
///
/// # Thread Safety
///
/// `StoreDir` holds an exclusive advisory lock on the store directory.
/// Only one instance can exist per directory at a time; the lock is
/// released when the instance is dropped.
#[derive(Debug)]
pub struct StoreDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl StoreDir {
    /// Opens or creates a store directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the store directory
    /// * `create_if_missing` - If true, creates the directory if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The path exists but is not a directory
    /// - Another process holds the lock (returns [`StorageError::Locked`])
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool) -> StorageResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StorageError::Missing {
                    path: path.to_path_buf(),
                });
            }
        }

        if !path.is_dir() {
            return Err(StorageError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a file backend for the named table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn table(&self, name: &str) -> StorageResult<FileBackend> {
        let mut path = self.path.join(name);
        path.set_extension(TABLE_EXT);
        FileBackend::open(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StorageBackend;
    use tempfile::TempDir;

    #[test]
    fn creates_directory_when_requested() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("store");

        let store = StoreDir::open(&store_path, true).unwrap();
        assert!(store_path.is_dir());
        assert_eq!(store.path(), store_path);
    }

    #[test]
    fn missing_directory_without_create_fails() {
        let dir = TempDir::new().unwrap();
        let result = StoreDir::open(&dir.path().join("absent"), false);
        assert!(matches!(result, Err(StorageError::Missing { .. })));
    }

    #[test]
    fn second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let _first = StoreDir::open(dir.path(), true).unwrap();

        let second = StoreDir::open(dir.path(), true);
        assert!(matches!(second, Err(StorageError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        {
            let _store = StoreDir::open(dir.path(), true).unwrap();
        }
        assert!(StoreDir::open(dir.path(), true).is_ok());
    }

    #[test]
    fn table_backend_uses_tbl_extension() {
        let dir = TempDir::new().unwrap();
        let store = StoreDir::open(dir.path(), true).unwrap();

        let mut backend = store.table("events").unwrap();
        backend.write(b"rows").unwrap();
        assert!(dir.path().join("events.tbl").exists());
    }
}
