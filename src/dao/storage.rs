use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A uniqueness constraint rejected the write (username, city or challenge code).
    #[error("duplicate key on `{key}`")]
    DuplicateKey { key: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a duplicate key error for the given key value.
    pub fn duplicate(key: impl Into<String>) -> Self {
        StorageError::DuplicateKey { key: key.into() }
    }

    /// Whether the failure was a uniqueness violation rather than an outage.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StorageError::DuplicateKey { .. })
    }
}
