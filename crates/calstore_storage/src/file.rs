//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// The snapshot lives in a single file. Replacement is atomic: the new
/// snapshot is written to a sibling `.tmp` file, synced, then renamed over
/// the live file. A crash mid-write leaves the previous snapshot intact.
///
/// # Example
///
/// ```no_run
/// use calstore_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("events.tbl")).unwrap();
/// backend.write(b"snapshot").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileBackend {
    /// Opens a file backend at the given path.
    ///
    /// The file itself is created lazily on the first `write`; a missing
    /// file reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a stale temporary file cannot be removed.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let tmp_path = path.with_extension("tmp");

        // A leftover tmp file is an interrupted write; the live file is
        // still the authoritative snapshot.
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        match File::open(&self.path) {
            Ok(mut file) => {
                let mut buffer = Vec::new();
                file.read_to_end(&mut buffer)?;
                Ok(Some(buffer))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.tmp_path)?;
        tmp.write_all(data)?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        match File::open(&self.path) {
            Ok(file) => {
                file.sync_all()?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(&dir.path().join("events.tbl")).unwrap();
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("events.tbl")).unwrap();

        backend.write(b"snapshot one").unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"snapshot one");

        backend.write(b"snapshot two").unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"snapshot two");
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calendars.tbl");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.write(b"durable").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"durable");
    }

    #[test]
    fn stale_tmp_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.tbl");

        fs::write(&path, b"good").unwrap();
        fs::write(path.with_extension("tmp"), b"torn write").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read().unwrap().unwrap(), b"good");
        assert!(!path.with_extension("tmp").exists());
    }
}
