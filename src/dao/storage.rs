use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by key-value backends regardless of where the bytes live.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read or written (disabled, quota, IO failure).
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored document exists but does not decode into the expected shape.
    #[error("malformed value under `{key}`")]
    Malformed {
        /// Key of the offending document.
        key: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a decoding error for the document stored under `key`.
    pub fn malformed(key: &str, source: serde_json::Error) -> Self {
        StorageError::Malformed {
            key: key.to_string(),
            source,
        }
    }
}
