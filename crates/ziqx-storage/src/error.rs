//! Error types for the storage facade.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by [`crate::ObjectStorage`].
///
/// Every backend failure maps to `OperationFailed` carrying the backend's
/// message as the cause.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend rejected or failed the operation.
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    /// Presigned URL lifetime is zero or above the backend maximum.
    #[error("Invalid signed URL lifetime: {0:?}")]
    InvalidTtl(Duration),

    /// Storage settings are missing or invalid.
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        StorageError::OperationFailed(err.to_string())
    }
}

impl From<object_store::path::Error> for StorageError {
    fn from(err: object_store::path::Error) -> Self {
        StorageError::OperationFailed(err.to_string())
    }
}
