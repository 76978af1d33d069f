//! Rename by copy.
//!
//! The backend has no move operation. A rename runs four steps:
//!
//! 1. stat `src` for its size
//! 2. read all of `src`
//! 3. `write_full` the bytes over `dst`
//! 4. remove `src`
//!
//! The sequence is not atomic. A failure before step 3 leaves `src` intact and
//! `dst` unchanged. A failure in step 4 leaves both objects with identical
//! content; removing `src` again completes the rename. Nothing is rolled back.

use crate::error::{EnvError, EnvResult, RenameStep};
use objenv_store::{ObjectStore, StoreError};
use std::io;

/// Moves `src` to `dst`, overwriting `dst`.
///
/// Renaming an existing object to itself only checks that it exists.
///
/// # Errors
///
/// Returns [`EnvError::Rename`] naming the step that failed.
pub fn rename(store: &dyn ObjectStore, src: &str, dst: &str) -> EnvResult<()> {
    let fail = |step, source| EnvError::rename(step, src, dst, source);

    let size = store.stat(src).map_err(|e| fail(RenameStep::Stat, e))?.size;
    if src == dst {
        return Ok(());
    }
    let len = usize::try_from(size).map_err(|_| {
        fail(
            RenameStep::Read,
            StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("object of {size} bytes does not fit in memory"),
            )),
        )
    })?;

    let data = store
        .read(src, 0, len)
        .map_err(|e| fail(RenameStep::Read, e))?;
    if data.len() != len {
        return Err(fail(
            RenameStep::Read,
            StoreError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("read {} of {len} bytes", data.len()),
            )),
        ));
    }
    tracing::debug!(src, dst, size, "rename: copied source");

    store
        .write_full(dst, &data)
        .map_err(|e| fail(RenameStep::Write, e))?;
    store.remove(src).map_err(|e| fail(RenameStep::Remove, e))?;

    tracing::debug!(src, dst, "rename: done");
    Ok(())
}
