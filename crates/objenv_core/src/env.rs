//! The storage-engine environment and its object-store implementation.

use crate::catalog::Catalog;
use crate::config::EnvConfig;
use crate::error::EnvResult;
use crate::file::{RandomAccessFile, SequentialFile, WritableFile};
use crate::lock::{FileLock, LockAllocator};
use crate::reader::{RandomAccessReader, SequentialReader};
use crate::rename;
use crate::writer::{AppendWriter, WriteMode};
use crate::BackendHandle;

/// The file operations a log-structured storage engine needs.
pub trait Env: Send + Sync {
    /// Opens `name` for forward-only reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn new_sequential_file(&self, name: &str) -> EnvResult<Box<dyn SequentialFile>>;

    /// Opens `name` for positional reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    fn new_random_access_file(&self, name: &str) -> EnvResult<Box<dyn RandomAccessFile>>;

    /// Opens `name` for writing, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn new_writable_file(&self, name: &str) -> EnvResult<Box<dyn WritableFile>>;

    /// Opens `name` for appending after its existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn new_appendable_file(&self, name: &str) -> EnvResult<Box<dyn WritableFile>>;

    /// Returns true if `name` exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Returns the names under `dir`, relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails.
    fn children(&self, dir: &str) -> EnvResult<Vec<String>>;

    /// Deletes `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be removed.
    fn remove_file(&self, name: &str) -> EnvResult<()>;

    /// Creates directory `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir(&self, name: &str) -> EnvResult<()>;

    /// Deletes directory `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    fn remove_dir(&self, name: &str) -> EnvResult<()>;

    /// Returns the size of `name` in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be inspected.
    fn file_size(&self, name: &str) -> EnvResult<u64>;

    /// Moves `src` to `dst`, replacing `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the move fails.
    fn rename_file(&self, src: &str, dst: &str) -> EnvResult<()>;

    /// Takes an advisory lock on `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be taken.
    fn lock_file(&self, name: &str) -> EnvResult<FileLock>;

    /// Releases a lock taken with [`Env::lock_file`].
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be released.
    fn unlock_file(&self, lock: FileLock) -> EnvResult<()>;

    /// Returns a directory for temporary test files.
    ///
    /// # Errors
    ///
    /// Returns an error if no such directory is available.
    fn test_directory(&self) -> EnvResult<String>;
}

/// An [`Env`] whose files are objects in a flat object store.
///
/// Every file, reader and writer shares the same backend handle; it lives
/// as long as its longest holder.
///
/// # Example
///
/// ```rust
/// use objenv_core::{Env, ObjectEnv};
/// use objenv_store::MemoryStore;
/// use std::sync::Arc;
///
/// let env = ObjectEnv::new(Arc::new(MemoryStore::new()));
/// let mut log = env.new_writable_file("db/000001.log").unwrap();
/// log.append(b"ABC").unwrap();
/// log.sync().unwrap();
///
/// let table = env.new_random_access_file("db/000001.log").unwrap();
/// assert_eq!(table.read_at(0, 3).unwrap(), b"ABC");
/// assert_eq!(env.children("db").unwrap(), vec!["000001.log".to_string()]);
/// ```
pub struct ObjectEnv {
    store: BackendHandle,
    config: EnvConfig,
    catalog: Catalog,
    locks: LockAllocator,
}

impl ObjectEnv {
    /// Creates an environment over `store` with the default configuration.
    pub fn new(store: BackendHandle) -> Self {
        Self::with_config(store, EnvConfig::default())
    }

    /// Creates an environment over `store`.
    pub fn with_config(store: BackendHandle, config: EnvConfig) -> Self {
        let catalog = Catalog::new(BackendHandle::clone(&store), config.separator);
        Self {
            store,
            config,
            catalog,
            locks: LockAllocator::new(),
        }
    }

    /// Returns the shared backend handle.
    #[must_use]
    pub fn store(&self) -> &BackendHandle {
        &self.store
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Returns the namespace catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the number of lock handles currently held.
    #[must_use]
    pub fn locks_held(&self) -> usize {
        self.locks.held()
    }

    /// Opens a concrete writer on `name`.
    ///
    /// [`Env::new_writable_file`] and [`Env::new_appendable_file`] box the
    /// result of this; callers that need the outstanding-append count use it
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns `CreateFailed` if the object cannot be prepared.
    pub fn open_writer(&self, name: &str, mode: WriteMode) -> EnvResult<AppendWriter> {
        AppendWriter::open(
            BackendHandle::clone(&self.store),
            name,
            mode,
            self.config.sync_on_close,
        )
    }

    fn write_mode(&self) -> WriteMode {
        if self.config.truncate_existing {
            WriteMode::Truncate
        } else {
            WriteMode::Append
        }
    }
}

impl Env for ObjectEnv {
    fn new_sequential_file(&self, name: &str) -> EnvResult<Box<dyn SequentialFile>> {
        Ok(Box::new(SequentialReader::new(
            BackendHandle::clone(&self.store),
            name,
        )))
    }

    fn new_random_access_file(&self, name: &str) -> EnvResult<Box<dyn RandomAccessFile>> {
        Ok(Box::new(RandomAccessReader::new(
            BackendHandle::clone(&self.store),
            name,
        )))
    }

    fn new_writable_file(&self, name: &str) -> EnvResult<Box<dyn WritableFile>> {
        Ok(Box::new(self.open_writer(name, self.write_mode())?))
    }

    fn new_appendable_file(&self, name: &str) -> EnvResult<Box<dyn WritableFile>> {
        Ok(Box::new(self.open_writer(name, WriteMode::Append)?))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.catalog.exists(name)
    }

    fn children(&self, dir: &str) -> EnvResult<Vec<String>> {
        self.catalog.children(dir)
    }

    fn remove_file(&self, name: &str) -> EnvResult<()> {
        self.catalog.delete(name)
    }

    fn create_dir(&self, _name: &str) -> EnvResult<()> {
        Ok(())
    }

    fn remove_dir(&self, _name: &str) -> EnvResult<()> {
        Ok(())
    }

    fn file_size(&self, name: &str) -> EnvResult<u64> {
        self.catalog.size(name)
    }

    fn rename_file(&self, src: &str, dst: &str) -> EnvResult<()> {
        rename::rename(self.store.as_ref(), src, dst)
    }

    fn lock_file(&self, name: &str) -> EnvResult<FileLock> {
        let lock = self.locks.lock(name);
        tracing::debug!(name, id = lock.id(), "lock handle issued");
        Ok(lock)
    }

    fn unlock_file(&self, lock: FileLock) -> EnvResult<()> {
        tracing::debug!(name = lock.name(), id = lock.id(), "lock handle released");
        self.locks.unlock(lock);
        Ok(())
    }

    fn test_directory(&self) -> EnvResult<String> {
        Ok(self.config.scratch_dir.clone())
    }
}
