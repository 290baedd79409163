//! Error types shared by the file storage implementation.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`FileDaoError`] failures.
pub type FileResult<T> = Result<T, FileDaoError>;

/// Failures that can occur while reading or writing the data directory.
#[derive(Debug, Error)]
pub enum FileDaoError {
    /// The data directory could not be created.
    #[error("failed to create data directory `{path}`")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A key file exists but could not be read.
    #[error("failed to read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing the temporary file failed.
    #[error("failed to write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Moving the temporary file into place failed.
    #[error("failed to replace `{path}`")]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A flag file does not contain a JSON boolean.
    #[error("flag file `{path}` is not a boolean")]
    DecodeFlag {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Key contains characters that cannot be used as a file name.
    #[error("invalid storage key `{key}`")]
    InvalidKey { key: String },
}

impl From<FileDaoError> for StorageError {
    fn from(err: FileDaoError) -> Self {
        match err {
            FileDaoError::Read { .. } | FileDaoError::DecodeFlag { .. } => {
                StorageError::read(err.to_string(), err)
            }
            _ => StorageError::write(err.to_string(), err),
        }
    }
}
