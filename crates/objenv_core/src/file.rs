//! File capabilities handed to the storage engine.

use crate::error::EnvResult;

/// A forward-only reader.
pub trait SequentialFile: Send {
    /// Reads up to `n` bytes at the cursor and advances past them.
    ///
    /// Returns fewer than `n` bytes, possibly none, at end of file.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails; the cursor is unchanged.
    fn read(&mut self, n: usize) -> EnvResult<Vec<u8>>;

    /// Advances the cursor by `n` bytes without reading.
    ///
    /// # Errors
    ///
    /// Never fails for object-backed files; the signature matches engines
    /// whose skip can.
    fn skip(&mut self, n: u64) -> EnvResult<()>;
}

/// A positional reader.
///
/// Reads take `&self` and may run concurrently.
pub trait RandomAccessFile: Send + Sync {
    /// Reads up to `n` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn read_at(&self, offset: u64, n: usize) -> EnvResult<Vec<u8>>;
}

/// An append-only writer with a durability barrier.
pub trait WritableFile: Send {
    /// Appends `data` at the end of the file.
    ///
    /// May return before the data is durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the append could not be issued.
    fn append(&mut self, data: &[u8]) -> EnvResult<()>;

    /// Hints that buffered appends should be committed soon.
    ///
    /// # Errors
    ///
    /// Returns an error if the hint could not be issued.
    fn flush(&mut self) -> EnvResult<()>;

    /// Blocks until every append so far is durable.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the appends waited for.
    fn sync(&mut self) -> EnvResult<()>;

    /// Closes the file.
    ///
    /// # Errors
    ///
    /// Returns an error only when closing also syncs.
    fn close(&mut self) -> EnvResult<()>;
}
