//! Local persistence for run snapshots.
//!
//! Each run lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   snapshot.json    # Serialized run state
//! ```
//!
//! This is the persistence collaborator's reference implementation; the
//! core itself only encodes and decodes (see [`crate::snapshot`]).

use std::{fs, io, path::PathBuf};

use uuid::Uuid;

use crate::snapshot::{self, Snapshot};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("run not found: {0}")]
    RunNotFound(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] snapshot::SnapshotError),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// File-based storage for run snapshots.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.regimen/runs/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".regimen").join("runs"))
    }

    /// Writes a run's snapshot, replacing any previous one.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = self.run_dir(snapshot.identifier);
        fs::create_dir_all(&dir)?;
        let json = snapshot::encode(snapshot)?;
        fs::write(dir.join("snapshot.json"), json)?;
        Ok(())
    }

    /// Loads a run's snapshot.
    pub fn load(&self, id: Uuid) -> Result<Snapshot> {
        let path = self.run_dir(id).join("snapshot.json");
        if !path.exists() {
            return Err(StorageError::RunNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        Ok(snapshot::decode(&json)?)
    }

    /// Loads a run's snapshot, treating a missing or undecodable file
    /// as absent. Read and decode failures are logged, never surfaced.
    pub fn load_or_absent(&self, id: Uuid) -> Option<Snapshot> {
        let path = self.run_dir(id).join("snapshot.json");
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("failed to read {}: {e}", path.display());
                return None;
            }
        };
        snapshot::decode_or_absent(&json)
    }

    /// Lists the identifiers of every stored run.
    pub fn list_runs(&self) -> Result<Vec<Uuid>> {
        let mut runs = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(runs),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.path().join("snapshot.json").is_file() {
                continue;
            }
            if let Ok(id) = entry.file_name().to_string_lossy().parse::<Uuid>() {
                runs.push(id);
            }
        }
        runs.sort();
        Ok(runs)
    }

    fn run_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    use crate::model::ResultAggregate;
    use crate::reminder::ReminderConfig;

    fn test_store() -> (TempDir, SnapshotStore) {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("runs")).unwrap();
        (dir, store)
    }

    fn sample_snapshot() -> Snapshot {
        let mut aggregate = ResultAggregate::new();
        aggregate.apply_selection(&["ibuprofen"]);
        snapshot::capture(&aggregate, &ReminderConfig::Unset)
    }

    #[test]
    fn save_and_load_round_trip() {
        let (_dir, store) = test_store();
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        let loaded = store.load(snapshot.identifier).unwrap();

        assert_eq!(loaded.identifier, snapshot.identifier);
        assert_eq!(loaded.items[0].identifier, "ibuprofen");
    }

    #[test]
    fn save_replaces_the_previous_snapshot() {
        let (_dir, store) = test_store();
        let mut snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();

        snapshot.reminders = Some(vec![15]);
        store.save(&snapshot).unwrap();

        let loaded = store.load(snapshot.identifier).unwrap();
        assert_eq!(loaded.reminders, Some(vec![15]));
    }

    #[test]
    fn load_nonexistent_run_fails() {
        let (_dir, store) = test_store();
        let err = store.load(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::RunNotFound(_)));
    }

    #[test]
    fn corrupt_snapshot_is_absent_not_fatal() {
        let (_dir, store) = test_store();
        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();

        let path = store
            .run_dir(snapshot.identifier)
            .join("snapshot.json");
        fs::write(path, "{ corrupt").unwrap();

        assert!(store.load_or_absent(snapshot.identifier).is_none());
        assert!(store.load(snapshot.identifier).is_err());
    }

    #[test]
    fn missing_snapshot_is_absent_not_fatal() {
        let (_dir, store) = test_store();
        assert!(store.load_or_absent(Uuid::new_v4()).is_none());
    }

    #[test]
    fn unreadable_snapshot_is_absent_not_fatal() {
        let (_dir, store) = test_store();
        let id = Uuid::new_v4();
        // A directory where the file should be makes the read fail
        // with something other than NotFound.
        fs::create_dir_all(store.run_dir(id).join("snapshot.json")).unwrap();

        assert!(store.load_or_absent(id).is_none());
    }

    #[test]
    fn list_runs_returns_stored_identifiers() {
        let (_dir, store) = test_store();
        assert!(store.list_runs().unwrap().is_empty());

        let first = sample_snapshot();
        let second = sample_snapshot();
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let mut expected = vec![first.identifier, second.identifier];
        expected.sort();
        assert_eq!(store.list_runs().unwrap(), expected);
    }
}
