//! Error types for the ObjEnv adapter.

use objenv_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Result type for adapter operations.
pub type EnvResult<T> = Result<T, EnvError>;

/// The step of a rename that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStep {
    /// Looking up the size of the source.
    Stat,
    /// Reading the full source content.
    Read,
    /// Writing the content over the destination.
    Write,
    /// Removing the source.
    Remove,
}

impl fmt::Display for RenameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::Stat => "stat",
            Self::Read => "read",
            Self::Write => "write",
            Self::Remove => "remove",
        };
        f.write_str(step)
    }
}

/// Errors that can occur in adapter operations.
///
/// Every variant names the file involved; backend failures keep the
/// backend's error as their source.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The named object does not exist.
    #[error("{op}: {name}: not found")]
    NotFound {
        /// The failing operation.
        op: &'static str,
        /// The file name.
        name: String,
    },

    /// A backend operation failed.
    #[error("{op}: {name}: {source}")]
    Io {
        /// The failing operation.
        op: &'static str,
        /// The file name.
        name: String,
        /// The backend error.
        source: StoreError,
    },

    /// The object backing a new writer could not be created.
    #[error("create {name}: {source}")]
    CreateFailed {
        /// The file name.
        name: String,
        /// The backend error.
        source: StoreError,
    },

    /// A rename stopped at `step`.
    ///
    /// Steps before `step` have taken effect and are not rolled back.
    #[error("rename {src} -> {dst}: {step} failure: {source}")]
    Rename {
        /// The step that failed.
        step: RenameStep,
        /// Source name.
        src: String,
        /// Destination name.
        dst: String,
        /// The backend error.
        source: StoreError,
    },

    /// The writer has been closed.
    #[error("{name}: writer is closed")]
    Closed {
        /// The file name.
        name: String,
    },
}

impl EnvError {
    /// Maps a backend error for `op` on `name`.
    ///
    /// A missing object becomes [`EnvError::NotFound`], anything else
    /// [`EnvError::Io`].
    pub fn from_store(op: &'static str, name: impl Into<String>, source: StoreError) -> Self {
        let name = name.into();
        if source.is_not_found() {
            Self::NotFound { op, name }
        } else {
            Self::Io { op, name, source }
        }
    }

    /// Creates a rename error.
    pub fn rename(
        step: RenameStep,
        src: impl Into<String>,
        dst: impl Into<String>,
        source: StoreError,
    ) -> Self {
        Self::Rename {
            step,
            src: src.into(),
            dst: dst.into(),
            source,
        }
    }

    /// Returns true if the error reports a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Rename { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns the rename step that failed, if this is a rename error.
    #[must_use]
    pub fn rename_step(&self) -> Option<RenameStep> {
        match self {
            Self::Rename { step, .. } => Some(*step),
            _ => None,
        }
    }
}
