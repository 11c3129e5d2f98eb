use affilink_catalog::{FormatError, ValidationError};
use thiserror::Error;

/// Errors from writing, listing, or reading snapshots.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Snapshot not found: {0}")]
    NotFound(String),

    #[error("Snapshot {id} is unreadable: {source}")]
    Unreadable { id: String, source: FormatError },

    #[error("Invalid snapshot id: {0}")]
    InvalidId(String),
}

impl BackupError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Errors from the record store.
///
/// `Validation` and `NotFound` leave the table untouched. `Backup` aborts a
/// mutation before it is applied. `Persist` means the change is live in
/// memory and backed up, but the canonical file is stale; call
/// [`crate::RecordStore::persist`] to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No record with id '{0}'")]
    NotFound(String),

    #[error("Backup failed, change not applied: {0}")]
    Backup(#[from] BackupError),

    #[error("Change applied in memory but {path} could not be written: {source}")]
    Persist {
        path: String,
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// True for backup and persist failures, which halt bulk runs.
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Backup(_) | Self::Persist { .. })
    }
}

/// A bulk run stopped on an operational failure.
#[derive(Debug, Error)]
#[error("Bulk run stopped after {committed} record(s) were committed: {source}")]
pub struct BulkError {
    /// Records changed in memory before the failure.
    pub committed: usize,
    #[source]
    pub source: StoreError,
}
