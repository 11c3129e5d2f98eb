use affilink_catalog::{ConfigError, FormatError};
use affilink_store::{BackupError, BulkError, StoreError};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bulk run stopped part way
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// Settings file or link template problem
    #[error("Config error: {0}")]
    Config(String),

    /// Malformed input file
    #[error("Input error: {0}")]
    Input(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config(e.to_string())
    }
}

impl From<FormatError> for CliError {
    fn from(e: FormatError) -> Self {
        Self::Store(StoreError::Format(e))
    }
}

impl From<BackupError> for CliError {
    fn from(e: BackupError) -> Self {
        Self::Store(StoreError::Backup(e))
    }
}
