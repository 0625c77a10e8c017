//! Durable homes for encoded snapshots.

use crate::checkpoint::error::StoreError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key-value store of encoded snapshots, keyed by machine id.
///
/// A `write` must be atomic: after a crash a reader sees either the previous
/// snapshot or the new one, never a partial write.
pub trait SnapshotStore: Send + Sync {
    fn write(&self, machine_id: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn read(&self, machine_id: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete a snapshot; returns `false` if there was none.
    fn remove(&self, machine_id: &str) -> Result<bool, StoreError>;
}

fn check_machine_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidMachineId { id: id.to_string() })
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One file per machine in a directory.
///
/// Writes go to a temporary sibling file that is flushed to disk and then
/// renamed over the target, so the target is replaced in one step.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
    extension: String,
}

impl FileStore {
    /// Open (and create if needed) a store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self {
            dir,
            extension: "json".to_string(),
        })
    }

    /// File extension for snapshot files (default `json`).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for `machine_id`.
    pub fn path_for(&self, machine_id: &str) -> Result<PathBuf, StoreError> {
        check_machine_id(machine_id)?;
        Ok(self.dir.join(format!("{machine_id}.{}", self.extension)))
    }

    fn sync_dir(&self) -> Result<(), StoreError> {
        #[cfg(unix)]
        File::open(&self.dir)
            .and_then(|d| d.sync_all())
            .map_err(io_error(&self.dir))?;
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn write(&self, machine_id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(machine_id)?;
        let temp = self.dir.join(format!(".{machine_id}.{}.tmp", self.extension));

        let replace = || -> Result<(), StoreError> {
            let mut file = File::create(&temp).map_err(io_error(&temp))?;
            file.write_all(bytes).map_err(io_error(&temp))?;
            file.sync_all().map_err(io_error(&temp))?;
            drop(file);
            fs::rename(&temp, &path).map_err(io_error(&path))
        };
        if let Err(e) = replace() {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        self.sync_dir()?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote snapshot file");
        Ok(())
    }

    fn read(&self, machine_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(machine_id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn remove(&self, machine_id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(machine_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

/// In-process store, for tests and embedding without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A writer that panicked cannot leave a half-inserted entry behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn write(&self, machine_id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        check_machine_id(machine_id)?;
        self.lock().insert(machine_id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, machine_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_machine_id(machine_id)?;
        Ok(self.lock().get(machine_id).cloned())
    }

    fn remove(&self, machine_id: &str) -> Result<bool, StoreError> {
        check_machine_id(machine_id)?;
        Ok(self.lock().remove(machine_id).is_some())
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<T> {
    fn write(&self, machine_id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write(machine_id, bytes)
    }

    fn read(&self, machine_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read(machine_id)
    }

    fn remove(&self, machine_id: &str) -> Result<bool, StoreError> {
        (**self).remove(machine_id)
    }
}
