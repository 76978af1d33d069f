//! Object-backed readers.

use crate::error::{EnvError, EnvResult};
use crate::file::{RandomAccessFile, SequentialFile};
use crate::BackendHandle;

/// Reads one object front to back.
///
/// Each `read` issues a single ranged read at the cursor. The cursor only
/// moves forward.
pub struct SequentialReader {
    store: BackendHandle,
    name: String,
    cursor: u64,
}

impl SequentialReader {
    /// Creates a reader positioned at the start of `name`.
    ///
    /// Performs no backend I/O; a missing object is reported by the first
    /// read.
    pub fn new(store: BackendHandle, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            cursor: 0,
        }
    }

    /// Returns the object name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current cursor offset.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.cursor
    }
}

impl SequentialFile for SequentialReader {
    fn read(&mut self, n: usize) -> EnvResult<Vec<u8>> {
        let data = self
            .store
            .read(&self.name, self.cursor, n)
            .map_err(|e| EnvError::from_store("SequentialFile::read", &self.name, e))?;
        self.cursor += data.len() as u64;
        Ok(data)
    }

    fn skip(&mut self, n: u64) -> EnvResult<()> {
        self.cursor = self.cursor.saturating_add(n);
        Ok(())
    }
}

/// Reads arbitrary ranges of one object.
///
/// Holds no cursor, so concurrent reads do not interfere.
pub struct RandomAccessReader {
    store: BackendHandle,
    name: String,
}

impl RandomAccessReader {
    /// Creates a reader for `name`.
    ///
    /// Performs no backend I/O.
    pub fn new(store: BackendHandle, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Returns the object name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RandomAccessFile for RandomAccessReader {
    fn read_at(&self, offset: u64, n: usize) -> EnvResult<Vec<u8>> {
        self.store
            .read(&self.name, offset, n)
            .map_err(|e| EnvError::from_store("RandomAccessFile::read", &self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objenv_store::{MemoryStore, StoreOp};
    use std::sync::Arc;
    use std::thread;

    fn store_with(name: &str, data: &[u8]) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_objects([(name, data.to_vec())]))
    }

    #[test]
    fn sequential_reads_advance() {
        let store = store_with("f", b"hello world");
        let mut reader = SequentialReader::new(store, "f");

        assert_eq!(reader.read(5).unwrap(), b"hello");
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.read(100).unwrap(), b" world");
        assert_eq!(reader.position(), 11);
        assert!(reader.read(10).unwrap().is_empty());
        assert_eq!(reader.position(), 11);
    }

    #[test]
    fn sequential_skip_does_no_io() {
        let store = store_with("f", b"0123456789");
        store.inject_fault(StoreOp::Read, "f");
        let mut reader = SequentialReader::new(store.clone(), "f");

        reader.skip(4).unwrap();
        assert_eq!(reader.position(), 4);

        // The armed fault is still waiting for the first real read.
        assert!(reader.read(2).is_err());
        assert_eq!(reader.read(2).unwrap(), b"45");
    }

    #[test]
    fn sequential_error_leaves_cursor() {
        let store = store_with("f", b"abcdef");
        let mut reader = SequentialReader::new(store.clone(), "f");
        reader.read(2).unwrap();

        store.inject_fault(StoreOp::Read, "f");
        let err = reader.read(2).unwrap_err();
        assert!(matches!(err, EnvError::Io { .. }));
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read(2).unwrap(), b"cd");
    }

    #[test]
    fn sequential_missing_object_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let mut reader = SequentialReader::new(store, "missing");
        assert!(reader.read(1).unwrap_err().is_not_found());
    }

    #[test]
    fn random_reads_are_idempotent() {
        let store = store_with("f", b"hello world");
        let reader = RandomAccessReader::new(store, "f");
        assert_eq!(reader.read_at(6, 5).unwrap(), b"world");
        assert_eq!(reader.read_at(6, 5).unwrap(), b"world");
        assert_eq!(reader.read_at(9, 10).unwrap(), b"ld");
        assert!(reader.read_at(50, 10).unwrap().is_empty());
    }

    #[test]
    fn random_reads_from_many_threads() {
        let data: Vec<u8> = (0..=255u8).collect();
        let store = store_with("f", &data);
        let reader = Arc::new(RandomAccessReader::new(store, "f"));

        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let reader = Arc::clone(&reader);
                thread::spawn(move || reader.read_at(i * 32, 32).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let chunk = handle.join().unwrap();
            assert_eq!(chunk, data[i * 32..(i + 1) * 32]);
        }
    }
}
