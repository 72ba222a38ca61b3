//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level snapshot store for one table.
///
/// Storage backends are **opaque blob stores**. Each backend holds the
/// latest serialized snapshot of a single table. calstore owns all format
/// interpretation - backends do not understand rows, timestamps, or
/// tombstones.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the most recent successful `write`
/// - `write` replaces the previous snapshot atomically: a reader never
///   observes a partially written snapshot, even across a crash
/// - `sync` ensures the latest snapshot is durable
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the current snapshot.
    ///
    /// Returns `None` if no snapshot has ever been written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the snapshot with `data`.
    ///
    /// The replacement is atomic: after a crash, `read` returns either the
    /// previous snapshot or the new one, never a mixture.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Syncs the latest snapshot to durable storage.
    ///
    /// After this returns successfully, the most recently written snapshot
    /// is guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;
}
