//! Error types for object store operations.

use crate::store::StoreOp;
use std::io;
use thiserror::Error;

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object not found: {key}")]
    NotFound {
        /// Key of the missing object.
        key: String,
    },

    /// Exclusive create found an existing object.
    #[error("object already exists: {key}")]
    AlreadyExists {
        /// Key of the existing object.
        key: String,
    },

    /// The key cannot be stored by this backend.
    #[error("invalid object key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fault was injected for this operation.
    #[error("injected fault on {op} of {key}")]
    Injected {
        /// The operation that was failed.
        op: StoreOp,
        /// The key the fault was armed for.
        key: String,
    },

    /// The backend dropped an asynchronous operation without acknowledging it.
    #[error("completion {token} abandoned by the backend")]
    Abandoned {
        /// Token of the abandoned operation.
        token: u64,
    },
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Returns true if this error reports a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
