use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    models::snapshot::{CURRENT_VERSION, Snapshot},
    storage::{
        Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

/// Backups kept next to the snapshot file
const BACKUPS_KEPT: usize = 5;

/// Snapshot persisted as one pretty-printed JSON document.
///
/// Every save first copies the previous file into `backups/` beside it,
/// keeping the newest [`BACKUPS_KEPT`]. Writes go to a temporary file that
/// is renamed over the snapshot while holding an exclusive lock.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string())
    }

    fn backup_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or(Path::new("."))
            .join("backups")
    }

    /// Copies the current snapshot aside. Nothing to do before the first save.
    fn back_up(&self) -> Result<(), StorageError> {
        if !self.path.is_file() {
            return Ok(());
        }

        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(|source| StorageError::BackupFailed {
            path: dir.clone(),
            source,
        })?;

        let backup = dir.join(format!("{}-{}", self.file_name(), jiff::Timestamp::now()));
        let bytes = fs::copy(&self.path, &backup).map_err(|source| StorageError::BackupFailed {
            path: backup.clone(),
            source,
        })?;
        debug!(path = %backup.display(), bytes, "snapshot backed up");
        Ok(())
    }

    /// Deletes all but the newest backups of this snapshot
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let dir = self.backup_dir();
        let cleanup_failed = |source: std::io::Error| StorageError::CleanupFailed {
            dir: dir.clone(),
            source,
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(cleanup_failed(e)),
        };

        let prefix = format!("{}-", self.file_name());
        let mut backups: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(&prefix))
            })
            .collect();
        backups.sort();

        let excess = backups.len().saturating_sub(BACKUPS_KEPT);
        for old in backups.drain(..excess) {
            fs::remove_file(&old).map_err(cleanup_failed)?;
        }
        Ok(())
    }

    fn parse(&self, content: &str) -> Result<Snapshot, StorageError> {
        let parse_failed = |source: serde_json::Error| StorageError::ParseFailed {
            path: self.path.clone(),
            source,
        };

        let mut data: Value = serde_json::from_str(content).map_err(parse_failed)?;
        let version = detect_version(&data)?;
        if version > CURRENT_VERSION {
            return Err(StorageError::FutureVersion(version));
        }
        if version < CURRENT_VERSION {
            info!(from = version, to = CURRENT_VERSION, "migrating snapshot");
            data = apply_migrations(data, version, CURRENT_VERSION)?;
        }
        if let Some(object) = data.as_object_mut() {
            object.insert("version".to_string(), json!(CURRENT_VERSION));
        }

        serde_json::from_value(data).map_err(parse_failed)
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => self.parse(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|source| StorageError::SerializeFailed { source })?;
        let save_failed = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StorageError::SaveFailed { path, source }
        };

        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        fs::write(&temp_path, content).map_err(save_failed(&temp_path))?;

        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(save_failed(&lock_path))?;
        lock.lock_exclusive().map_err(save_failed(&lock_path))?;

        self.back_up()?;
        self.rotate_backups()?;
        fs::rename(&temp_path, &self.path).map_err(save_failed(&self.path))?;
        FileExt::unlock(&lock).map_err(save_failed(&lock_path))?;

        debug!(path = %self.path.display(), last_id = snapshot.max_id(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures;

    fn backups_in(dir: &Path) -> usize {
        fs::read_dir(dir.join("backups"))
            .map(|entries| entries.flatten().filter(|e| e.path().is_file()).count())
            .unwrap_or(0)
    }

    #[test]
    fn test_saved_snapshot_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        let snapshot = fixtures::seed();

        storage.save(&snapshot).unwrap();
        let loaded = storage.load().unwrap().expect("snapshot file should exist");

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("missing.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_garbage_file_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = JsonFileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::ParseFailed { .. })));
    }

    #[test]
    fn test_unversioned_file_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let legacy = json!({
            "project": [],
            "task": [{
                "Id": 3, "title": "Old task", "status": "To Do", "priority": "Low",
                "projectId": 1, "tags": "legacy, import",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
            }]
        });
        fs::write(&path, legacy.to_string()).unwrap();

        let snapshot = JsonFileStorage::new(path).load().unwrap().unwrap();

        assert_eq!(snapshot.version, CURRENT_VERSION);
        assert_eq!(snapshot.tasks[0]["tags"], json!(["legacy", "import"]));
        assert_eq!(snapshot.max_id(), 3);
    }

    #[test]
    fn test_newer_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"version": 999, "task": []}"#).unwrap();

        let result = JsonFileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::FutureVersion(999))));
    }

    #[test]
    fn test_backups_rotate_to_newest_five() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("store.json"));

        storage.save(&Snapshot::default()).unwrap();
        assert_eq!(backups_in(dir.path()), 0);

        for last_id in 1..=7 {
            let snapshot = Snapshot {
                last_id,
                ..Snapshot::default()
            };
            storage.save(&snapshot).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert_eq!(backups_in(dir.path()), BACKUPS_KEPT);
    }

    #[test]
    fn test_rotation_leaves_other_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        fs::write(backups.join("notes.txt"), "keep me").unwrap();

        let storage = JsonFileStorage::new(dir.path().join("store.json"));
        for _ in 0..8 {
            storage.save(&fixtures::seed()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(backups.join("notes.txt").is_file());
        assert_eq!(backups_in(dir.path()), BACKUPS_KEPT + 1);
    }
}
