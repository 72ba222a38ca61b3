//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend stores the snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use calstore_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.read().unwrap().is_none());
/// backend.write(b"table bytes").unwrap();
/// assert_eq!(backend.read().unwrap().unwrap(), b"table bytes");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-loaded with a snapshot.
    ///
    /// Useful for testing reopen scenarios.
    #[must_use]
    pub fn with_snapshot(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
        }
    }

    /// Clears the stored snapshot.
    pub fn clear(&mut self) {
        *self.data.write() = None;
    }
}

impl StorageBackend for InMemoryBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_backend_reads_none() {
        let backend = InMemoryBackend::new();
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn write_replaces_snapshot() {
        let mut backend = InMemoryBackend::new();
        backend.write(b"first").unwrap();
        backend.write(b"second").unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"second");
    }

    #[test]
    fn clear_removes_snapshot() {
        let mut backend = InMemoryBackend::with_snapshot(vec![1, 2, 3]);
        assert!(backend.read().unwrap().is_some());
        backend.clear();
        assert!(backend.read().unwrap().is_none());
    }
}
