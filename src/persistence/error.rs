use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures inside the storage boundary. These never reach the store's callers: loads
/// degrade to default data and saves are logged.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse stored value under {key:?}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize timesheet data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
