//! In-memory object store for testing.

use crate::completion::{Completion, CompletionSender};
use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectStat, ObjectStore, StoreOp};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct Object {
    data: Vec<u8>,
    mtime: SystemTime,
}

impl Object {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            mtime: SystemTime::now(),
        }
    }
}

struct AppendJob {
    key: String,
    data: Vec<u8>,
    ack: CompletionSender,
}

/// State shared between the store handle and its applier thread.
#[derive(Default)]
struct Shared {
    objects: RwLock<BTreeMap<String, Object>>,
    /// Armed faults: remaining failures per (operation, key).
    faults: Mutex<HashMap<(StoreOp, String), usize>>,
    paused: Mutex<bool>,
    resumed: Condvar,
    pending: AtomicUsize,
}

impl Shared {
    fn check_fault(&self, op: StoreOp, key: &str) -> StoreResult<()> {
        let mut faults = self.faults.lock();
        let armed = (op, key.to_string());
        match faults.get_mut(&armed) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                if *remaining == 0 {
                    faults.remove(&armed);
                }
                Err(StoreError::Injected {
                    op,
                    key: key.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn wait_resumed(&self) {
        let mut paused = self.paused.lock();
        while *paused {
            self.resumed.wait(&mut paused);
        }
    }

    fn apply_append(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        if !data.is_empty() {
            self.check_fault(StoreOp::Append, key)?;
        }
        let mut objects = self.objects.write();
        let object = objects.entry(key.to_string()).or_insert_with(Object::empty);
        object.data.extend_from_slice(data);
        object.mtime = SystemTime::now();
        Ok(())
    }

    /// Applies queued appends one at a time, in submission order.
    fn run_applier(&self, jobs: Receiver<AppendJob>) {
        for job in jobs {
            self.wait_resumed();
            let result = self.apply_append(&job.key, &job.data);
            if let Err(e) = &result {
                tracing::debug!(key = %job.key, token = job.ack.token(), error = %e, "append failed");
            }
            self.pending.fetch_sub(1, Ordering::SeqCst);
            job.ack.complete(result);
        }
    }
}

/// An in-memory object store.
///
/// This store keeps every object in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// Appends are queued and applied by a background thread, so acknowledgement
/// is asynchronous exactly as with a remote backend. Tests can hold
/// acknowledgements back with [`MemoryStore::pause`] and make individual
/// operations fail with [`MemoryStore::inject_fault`].
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use objenv_store::{MemoryStore, ObjectStore};
///
/// let store = MemoryStore::new();
/// let completion = store.append("a.log", b"abc".to_vec()).unwrap();
/// completion.wait().unwrap();
/// assert_eq!(store.stat("a.log").unwrap().size, 3);
/// ```
pub struct MemoryStore {
    shared: Arc<Shared>,
    queue: Option<Sender<AppendJob>>,
    applier: Option<JoinHandle<()>>,
    next_token: AtomicU64,
    flush_hints: AtomicU64,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let shared = Arc::new(Shared::default());
        let (tx, rx) = channel::unbounded();
        let applier = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.run_applier(rx))
        };
        Self {
            shared,
            queue: Some(tx),
            applier: Some(applier),
            next_token: AtomicU64::new(1),
            flush_hints: AtomicU64::new(0),
        }
    }

    /// Creates a store pre-populated with objects.
    ///
    /// Useful for testing readers against known content.
    #[must_use]
    pub fn with_objects<I, K>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.shared.objects.write();
            for (key, data) in objects {
                map.insert(
                    key.into(),
                    Object {
                        data,
                        mtime: SystemTime::now(),
                    },
                );
            }
        }
        store
    }

    /// Returns a copy of the bytes of `key`, if present.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.shared.objects.read().get(key).map(|o| o.data.clone())
    }

    /// Returns the number of objects in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.objects.read().len()
    }

    /// Returns true if the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Holds back application and acknowledgement of queued appends.
    pub fn pause(&self) {
        *self.shared.paused.lock() = true;
    }

    /// Releases appends held back by [`MemoryStore::pause`].
    pub fn resume(&self) {
        *self.shared.paused.lock() = false;
        self.shared.resumed.notify_all();
    }

    /// Returns the number of submitted appends not yet acknowledged.
    #[must_use]
    pub fn pending_appends(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Returns how many flush hints have been received.
    #[must_use]
    pub fn flush_hints(&self) -> u64 {
        self.flush_hints.load(Ordering::SeqCst)
    }

    /// Makes the next `op` on `key` fail with [`StoreError::Injected`].
    ///
    /// Arming the same fault again adds one more failure. Append faults are
    /// reported through the completion, not at submission, and skip empty
    /// appends, which only order. List faults match the empty key.
    pub fn inject_fault(&self, op: StoreOp, key: &str) {
        *self
            .shared
            .faults
            .lock()
            .entry((op, key.to_string()))
            .or_insert(0) += 1;
    }

    /// Disarms every injected fault.
    pub fn clear_faults(&self) {
        self.shared.faults.lock().clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("objects", &self.len())
            .field("pending_appends", &self.pending_appends())
            .finish()
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.resume();
        // Closing the queue lets the applier drain and exit.
        self.queue.take();
        if let Some(applier) = self.applier.take() {
            let _ = applier.join();
        }
    }
}

impl ObjectStore for MemoryStore {
    fn read(&self, key: &str, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        self.shared.check_fault(StoreOp::Read, key)?;
        let objects = self.shared.objects.read();
        let object = objects.get(key).ok_or_else(|| StoreError::not_found(key))?;

        let size = object.data.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(size);
        let end = start.saturating_add(len).min(size);
        Ok(object.data[start..end].to_vec())
    }

    fn create(&self, key: &str, exclusive: bool) -> StoreResult<()> {
        self.shared.check_fault(StoreOp::Create, key)?;
        let mut objects = self.shared.objects.write();
        if objects.contains_key(key) {
            if exclusive {
                return Err(StoreError::AlreadyExists {
                    key: key.to_string(),
                });
            }
            return Ok(());
        }
        objects.insert(key.to_string(), Object::empty());
        Ok(())
    }

    fn append(&self, key: &str, data: Vec<u8>) -> StoreResult<Completion> {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let (ack, completion) = Completion::pair(token);
        let queue = self.queue.as_ref().ok_or(StoreError::Abandoned { token })?;

        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        let job = AppendJob {
            key: key.to_string(),
            data,
            ack,
        };
        if queue.send(job).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::Abandoned { token });
        }
        Ok(completion)
    }

    fn flush_async(&self) -> StoreResult<()> {
        self.flush_hints.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stat(&self, key: &str) -> StoreResult<ObjectStat> {
        self.shared.check_fault(StoreOp::Stat, key)?;
        let objects = self.shared.objects.read();
        let object = objects.get(key).ok_or_else(|| StoreError::not_found(key))?;
        Ok(ObjectStat {
            size: object.data.len() as u64,
            mtime: object.mtime,
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.shared.check_fault(StoreOp::Remove, key)?;
        self.shared
            .objects
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(key))
    }

    fn write_full(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.shared.check_fault(StoreOp::WriteFull, key)?;
        self.shared.objects.write().insert(
            key.to_string(),
            Object {
                data: data.to_vec(),
                mtime: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        self.shared.check_fault(StoreOp::List, "")?;
        Ok(self.shared.objects.read().keys().cloned().collect())
    }
}
