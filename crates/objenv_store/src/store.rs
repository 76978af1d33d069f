//! Object store trait definition.

use crate::completion::Completion;
use crate::error::StoreResult;
use std::fmt;
use std::time::SystemTime;

/// Metadata returned by [`ObjectStore::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectStat {
    /// Object size in bytes.
    pub size: u64,
    /// Time of the last modification.
    pub mtime: SystemTime,
}

/// The kinds of operation an object store performs.
///
/// Used to label injected faults and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Ranged read.
    Read,
    /// Object creation.
    Create,
    /// Asynchronous append.
    Append,
    /// Metadata lookup.
    Stat,
    /// Object removal.
    Remove,
    /// Whole-object overwrite.
    WriteFull,
    /// Namespace enumeration.
    List,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Append => "append",
            Self::Stat => "stat",
            Self::Remove => "remove",
            Self::WriteFull => "write_full",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// A flat-namespace keyed object store.
///
/// Object stores hold **opaque byte objects** addressed by string keys.
/// There are no directories; a key containing `/` is just a key.
///
/// # Invariants
///
/// - `read` never fails because a range runs past the end; it returns the
///   bytes that exist
/// - appends submitted through one store are applied in submission order,
///   whatever order their completions resolve in
/// - an append is durable once its [`Completion`] resolves to `Ok`
/// - stores must be `Send + Sync`; a single handle is shared across threads
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::DirStore`] - For persistent storage
pub trait ObjectStore: Send + Sync {
    /// Reads up to `len` bytes of `key` starting at `offset`.
    ///
    /// The result is shorter than `len` when the object ends first and empty
    /// when `offset` is at or past the end.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist, or an I/O error.
    fn read(&self, key: &str, offset: u64, len: usize) -> StoreResult<Vec<u8>>;

    /// Creates an empty object.
    ///
    /// With `exclusive == false` an existing object is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` for an exclusive create of an existing object.
    fn create(&self, key: &str, exclusive: bool) -> StoreResult<()>;

    /// Submits an asynchronous append of `data` to the end of `key`.
    ///
    /// The object is created if it does not exist. Returns as soon as the
    /// operation is queued; the result arrives through the [`Completion`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the operation could not be submitted.
    fn append(&self, key: &str, data: Vec<u8>) -> StoreResult<Completion>;

    /// Asks the backend to start committing outstanding appends.
    ///
    /// This is a hint and never waits for acknowledgements.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    fn flush_async(&self) -> StoreResult<()>;

    /// Returns the size and modification time of `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist.
    fn stat(&self, key: &str) -> StoreResult<ObjectStat>;

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Replaces the whole content of `key`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write_full(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Enumerates every key in the namespace.
    ///
    /// Order is backend-defined.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails.
    fn list(&self) -> StoreResult<Vec<String>>;
}
