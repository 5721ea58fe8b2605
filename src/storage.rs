use std::path::PathBuf;

use thiserror::Error;

use crate::models::snapshot::Snapshot;

pub mod json;
pub mod migrations;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load snapshot from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save snapshot to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot has a malformed version field: {0}")]
    MalformedVersion(String),

    #[error(
        "Snapshot was written by a newer version of taskboard (version {0}). Please upgrade taskboard to open this file."
    )]
    FutureVersion(u32),

    #[error("Snapshot has unsupported version {0}. This version of taskboard cannot read this file.")]
    UnsupportedVersion(u32),
}

pub trait Storage {
    /// Loads the persisted snapshot, or `None` when nothing was saved yet
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}
