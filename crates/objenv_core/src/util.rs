//! Whole-file helpers built on [`Env`].

use crate::env::Env;
use crate::error::EnvResult;

/// Size of each read issued by [`read_file_to_vec`].
const READ_CHUNK: usize = 64 * 1024;

/// Reads all of `name` through a sequential file.
///
/// # Errors
///
/// Returns the first read error.
pub fn read_file_to_vec<E: Env + ?Sized>(env: &E, name: &str) -> EnvResult<Vec<u8>> {
    let mut file = env.new_sequential_file(name)?;
    let mut out = Vec::new();
    loop {
        let chunk = file.read(READ_CHUNK)?;
        if chunk.is_empty() {
            return Ok(out);
        }
        out.extend_from_slice(&chunk);
    }
}

/// Writes `data` as the whole content of `name`.
///
/// With `sync` the call returns only once the data is durable. On failure
/// the partially written file is removed.
///
/// # Errors
///
/// Returns the first create, append, sync or close error.
pub fn write_file<E: Env + ?Sized>(env: &E, name: &str, data: &[u8], sync: bool) -> EnvResult<()> {
    let mut file = env.new_writable_file(name)?;
    let mut result = file.append(data);
    if result.is_ok() && sync {
        result = file.sync();
    }
    if result.is_ok() {
        result = file.close();
    }
    if result.is_err() {
        if let Err(e) = file.close() {
            tracing::debug!(name, error = %e, "could not close partially written file");
        }
        if let Err(e) = env.remove_file(name) {
            tracing::debug!(name, error = %e, "could not remove partially written file");
        }
    }
    result
}
