//! Service-level error taxonomy
//!
//! Three failure classes, all non-fatal: bad caller input, a dataset that
//! could not be loaded (retryable on the next request), and an unavailable
//! storage backend. The coordinator converts each into the uniform
//! `{ ok: false, error }` response at its boundary.

use oaf_core::dataset::DatasetError;

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed caller input: invalid URL, missing required field.
    #[error("{0}")]
    InvalidInput(String),
    /// Dataset fetch or parse failure. Never cached; the next request
    /// re-attempts the load.
    #[error("{0}")]
    DataUnavailable(String),
    /// The underlying persistence failed. The caller may retry.
    #[error("{0}")]
    StorageUnavailable(String),
}

impl ServiceError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<DatasetError> for ServiceError {
    fn from(err: DatasetError) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
