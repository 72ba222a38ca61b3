//! Configuration for opening a calendar store.

use std::path::{Path, PathBuf};

/// Configuration for a file-backed [`crate::CalendarDb`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the store directory.
    pub path: PathBuf,
    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,
    /// Whether to fsync table snapshots after every committed write.
    ///
    /// When false, snapshots are still written atomically but durability
    /// is left to the OS page cache.
    pub sync_writes: bool,
}

impl StoreConfig {
    /// Creates a configuration for the given store directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            create_if_missing: true,
            sync_writes: false,
        }
    }

    /// Sets whether the directory is created if missing.
    #[must_use]
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets whether every committed write is fsynced.
    #[must_use]
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }
}
