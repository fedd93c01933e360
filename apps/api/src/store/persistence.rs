//! Durable storage for the serialized snapshot.
//!
//! The whole application state is one JSON blob under one key. Backends only
//! move strings; (de)serialization and fallback live in [`load_snapshot`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::AppSnapshot;

/// Storage key of the persisted blob.
pub const SNAPSHOT_KEY: &str = "resumeState";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A key-value slot holding the serialized snapshot.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, PersistError>;
    fn write(&self, blob: &str) -> Result<(), PersistError>;
}

// ────────────────────────────────────────────────────────────────────────────
// File backend
// ────────────────────────────────────────────────────────────────────────────

/// Stores the blob in a single file, replaced atomically on every write.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn write(&self, blob: &str) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_err(e))?;

        // Write beside the target and rename over it, so readers never see a torn file.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(blob.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(path = %self.path.display(), bytes = blob.len(), "Snapshot written");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Memory backend
// ────────────────────────────────────────────────────────────────────────────

/// Keeps the blob in process memory. Used for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn write(&self, blob: &str) -> Result<(), PersistError> {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(blob.to_string());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Load / save
// ────────────────────────────────────────────────────────────────────────────

/// Reads the persisted snapshot, falling back to the default document when
/// the key is absent, unreadable, or does not parse.
pub fn load_snapshot(store: &dyn SnapshotStore) -> AppSnapshot {
    let blob = match store.read() {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!("No persisted snapshot, starting from defaults");
            return AppSnapshot::default();
        }
        Err(e) => {
            warn!("Failed to read persisted snapshot, starting from defaults: {e}");
            return AppSnapshot::default();
        }
    };

    match serde_json::from_str::<AppSnapshot>(&blob) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Persisted snapshot is corrupt, starting from defaults: {e}");
            AppSnapshot::default()
        }
    }
}

pub fn save_snapshot(store: &dyn SnapshotStore, snapshot: &AppSnapshot) -> Result<(), PersistError> {
    let blob = serde_json::to_string(snapshot)?;
    store.write(&blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("resumeState.json"));
        assert!(store.read().unwrap().is_none());
        assert_eq!(load_snapshot(&store), AppSnapshot::default());
    }

    #[test]
    fn test_file_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested/data/resumeState.json"));

        let mut snapshot = AppSnapshot::default();
        snapshot.resume.summary = "Persisted".to_string();
        snapshot.skills_description = "Rust, Go".to_string();
        save_snapshot(&store, &snapshot).unwrap();

        assert_eq!(load_snapshot(&store), snapshot);
    }

    #[test]
    fn test_overwrite_replaces_previous_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("resumeState.json"));
        store.write("first").unwrap();
        store.write("second").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_default() {
        let store = MemorySnapshotStore::with_blob("{not json");
        assert_eq!(load_snapshot(&store), AppSnapshot::default());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        assert!(store.read().unwrap().is_none());

        let mut snapshot = AppSnapshot::default();
        snapshot.ats_score.score = 85;
        save_snapshot(&store, &snapshot).unwrap();
        assert_eq!(load_snapshot(&store).ats_score.score, 85);
    }
}
