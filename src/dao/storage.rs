use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a key failed; treated as "no saved game".
    #[error("storage read failed: {message}")]
    ReadFailure {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Writing a key failed; the session keeps playing from memory.
    #[error("storage write failed: {message}")]
    WriteFailure {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored record could not be decoded.
    #[error("stored record `{key}` is corrupt")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct a read error from any backend failure.
    pub fn read(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::ReadFailure {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a write error from any backend failure.
    pub fn write(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::WriteFailure {
            message,
            source: Box::new(source),
        }
    }
}
