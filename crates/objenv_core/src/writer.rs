//! Append-only writer with asynchronous acknowledgement tracking.
//!
//! Appends are issued to the backend and return immediately. Each append's
//! [`Completion`] is kept in the writer's outstanding set, keyed by token,
//! until the backend acknowledges it.
//!
//! ```text
//! append ──► backend queue ──► applied in issue order
//!    │
//!    └──► outstanding { token → Completion }
//!                 │
//!        flush: reap acknowledged entries (non-blocking)
//!        sync:  wait for every entry, surface the first failure
//!        close: reap, release the rest (no I/O)
//! ```

use crate::error::{EnvError, EnvResult};
use crate::file::WritableFile;
use crate::BackendHandle;
use objenv_store::{Completion, StoreError};
use std::collections::BTreeMap;

/// How a writer treats an object that already has content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Empty the object before the first append.
    Truncate,
    /// Keep the content and append after it.
    Append,
}

/// Writes one object through asynchronous backend appends.
///
/// # Ordering
///
/// All appends go to the single append stream of one object, so the backend
/// applies them in issue order whatever order they are acknowledged in.
///
/// # Concurrency
///
/// A writer has one owner at a time; every operation takes `&mut self`.
pub struct AppendWriter {
    store: BackendHandle,
    name: String,
    outstanding: BTreeMap<u64, Completion>,
    /// A failure reaped before the next sync.
    failed: Option<StoreError>,
    size: u64,
    sync_on_close: bool,
    closed: bool,
}

impl AppendWriter {
    /// Opens a writer on `name`, creating the object if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::CreateFailed`] if the object cannot be created,
    /// inspected or truncated. No writer exists in that case.
    ///
    /// Blocks until appends already queued for `name`, including those of
    /// writers closed without a sync, have been applied.
    pub fn open(
        store: BackendHandle,
        name: impl Into<String>,
        mode: WriteMode,
        sync_on_close: bool,
    ) -> EnvResult<Self> {
        let name = name.into();
        let create_failed = |source| EnvError::CreateFailed {
            name: name.clone(),
            source,
        };

        store.create(&name, false).map_err(create_failed)?;
        // An empty append queues behind every earlier append to `name`, so
        // the stat and truncate below see them applied.
        store
            .append(&name, Vec::new())
            .and_then(Completion::wait)
            .map_err(create_failed)?;
        let existing = store.stat(&name).map_err(create_failed)?.size;

        let size = match mode {
            WriteMode::Append => existing,
            WriteMode::Truncate if existing > 0 => {
                store.write_full(&name, &[]).map_err(create_failed)?;
                0
            }
            WriteMode::Truncate => 0,
        };

        tracing::debug!(name = %name, ?mode, size, "opened writer");
        Ok(Self {
            store,
            name,
            outstanding: BTreeMap::new(),
            failed: None,
            size,
            sync_on_close,
            closed: false,
        })
    }

    /// Returns the object name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size the object will have once every append lands.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the number of appends not yet known to be acknowledged.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Returns true once the writer has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> EnvResult<()> {
        if self.closed {
            return Err(EnvError::Closed {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Drops acknowledged completions from the outstanding set without
    /// blocking. The first failure is kept for the next sync.
    fn reap(&mut self) {
        let done: Vec<u64> = self
            .outstanding
            .iter_mut()
            .filter_map(|(token, c)| c.is_complete().then_some(*token))
            .collect();

        for token in done {
            if let Some(completion) = self.outstanding.remove(&token) {
                if let Err(e) = completion.wait() {
                    tracing::debug!(name = %self.name, token, error = %e, "append failed");
                    self.failed.get_or_insert(e);
                }
            }
        }
    }

    fn drain(&mut self) -> Result<(), StoreError> {
        let mut first = self.failed.take();
        let outstanding = std::mem::take(&mut self.outstanding);
        let count = outstanding.len();

        for (token, completion) in outstanding {
            if let Err(e) = completion.wait() {
                tracing::debug!(name = %self.name, token, error = %e, "append failed");
                first.get_or_insert(e);
            }
        }

        tracing::debug!(name = %self.name, waited = count, ok = first.is_none(), "sync drained");
        first.map_or(Ok(()), Err)
    }
}

impl WritableFile for AppendWriter {
    fn append(&mut self, data: &[u8]) -> EnvResult<()> {
        self.ensure_open()?;
        if data.is_empty() {
            return Ok(());
        }

        let completion = self
            .store
            .append(&self.name, data.to_vec())
            .map_err(|e| EnvError::from_store("WritableFile::append", &self.name, e))?;
        self.size += data.len() as u64;
        self.outstanding.insert(completion.token(), completion);
        Ok(())
    }

    fn flush(&mut self) -> EnvResult<()> {
        self.ensure_open()?;
        self.store
            .flush_async()
            .map_err(|e| EnvError::from_store("WritableFile::flush", &self.name, e))?;
        self.reap();
        Ok(())
    }

    fn sync(&mut self) -> EnvResult<()> {
        self.ensure_open()?;
        self.drain()
            .map_err(|e| EnvError::from_store("WritableFile::sync", &self.name, e))
    }

    fn close(&mut self) -> EnvResult<()> {
        if self.closed {
            return Ok(());
        }

        let synced = if self.sync_on_close {
            self.sync()
        } else {
            Ok(())
        };

        self.reap();
        if let Some(e) = self.failed.take() {
            tracing::warn!(name = %self.name, error = %e, "closing writer with a failed append");
        }
        let released = std::mem::take(&mut self.outstanding).len();
        if released > 0 {
            tracing::debug!(name = %self.name, released, "closing writer with unacknowledged appends");
        }

        self.closed = true;
        synced
    }
}

impl Drop for AppendWriter {
    fn drop(&mut self) {
        if !self.closed && !self.outstanding.is_empty() {
            tracing::warn!(
                name = %self.name,
                outstanding = self.outstanding.len(),
                "writer dropped without close"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objenv_store::{MemoryStore, ObjectStore, StoreOp};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn open(store: &Arc<MemoryStore>, name: &str) -> AppendWriter {
        AppendWriter::open(store.clone(), name, WriteMode::Truncate, false).unwrap()
    }

    #[test]
    fn open_creates_object() {
        let store = Arc::new(MemoryStore::new());
        let writer = open(&store, "000001.log");
        assert_eq!(writer.size(), 0);
        assert_eq!(store.object("000001.log").unwrap(), b"");
    }

    #[test]
    fn open_failure_prevents_writer() {
        let store = Arc::new(MemoryStore::new());
        store.inject_fault(StoreOp::Create, "x.log");
        let result = AppendWriter::open(store.clone(), "x.log", WriteMode::Truncate, false);
        assert!(matches!(result, Err(EnvError::CreateFailed { .. })));
        assert!(store.object("x.log").is_none());
    }

    #[test]
    fn truncate_mode_empties_existing() {
        let store = Arc::new(MemoryStore::with_objects([("f", b"old".to_vec())]));
        let writer = open(&store, "f");
        assert_eq!(writer.size(), 0);
        assert_eq!(store.object("f").unwrap(), b"");
    }

    #[test]
    fn reopen_truncates_appends_left_by_closed_writer() {
        let store = Arc::new(MemoryStore::new());
        let mut first = open(&store, "CURRENT");
        store.pause();
        first.append(b"OLD").unwrap();
        first.close().unwrap();
        assert_eq!(store.pending_appends(), 1);

        let reopener = {
            let store = store.clone();
            thread::spawn(move || open(&store, "CURRENT"))
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!reopener.is_finished());

        store.resume();
        let mut second = reopener.join().unwrap();
        assert_eq!(second.size(), 0);
        second.append(b"NEW").unwrap();
        second.sync().unwrap();
        assert_eq!(store.object("CURRENT").unwrap(), b"NEW");
    }

    #[test]
    fn append_mode_sizes_after_queued_appends() {
        let store = Arc::new(MemoryStore::new());
        let mut first = open(&store, "LOG");
        store.pause();
        first.append(b"one\n").unwrap();
        first.close().unwrap();
        store.resume();

        let mut second = AppendWriter::open(store.clone(), "LOG", WriteMode::Append, false).unwrap();
        assert_eq!(second.size(), 4);
        second.append(b"two\n").unwrap();
        second.sync().unwrap();
        assert_eq!(store.object("LOG").unwrap(), b"one\ntwo\n");
    }

    #[test]
    fn append_mode_keeps_existing() {
        let store = Arc::new(MemoryStore::with_objects([("f", b"old".to_vec())]));
        let mut writer = AppendWriter::open(store.clone(), "f", WriteMode::Append, false).unwrap();
        assert_eq!(writer.size(), 3);
        writer.append(b"new").unwrap();
        writer.sync().unwrap();
        assert_eq!(store.object("f").unwrap(), b"oldnew");
        assert_eq!(writer.size(), 6);
    }

    #[test]
    fn sync_waits_for_all_appends() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "000001.log");

        writer.append(b"A").unwrap();
        writer.append(b"B").unwrap();
        writer.append(b"C").unwrap();
        writer.sync().unwrap();

        assert_eq!(writer.outstanding(), 0);
        assert_eq!(store.object("000001.log").unwrap(), b"ABC");
    }

    #[test]
    fn append_returns_before_acknowledgement() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.pause();

        writer.append(b"data").unwrap();
        assert_eq!(writer.outstanding(), 1);
        assert!(store.object("f").unwrap().is_empty());

        store.resume();
        writer.sync().unwrap();
        assert_eq!(store.object("f").unwrap(), b"data");
    }

    #[test]
    fn sync_blocks_until_acknowledged() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.pause();
        writer.append(b"held").unwrap();

        let syncer = thread::spawn(move || {
            let result = writer.sync();
            (writer, result)
        });
        thread::sleep(Duration::from_millis(50));
        assert!(!syncer.is_finished());

        store.resume();
        let (writer, result) = syncer.join().unwrap();
        result.unwrap();
        assert_eq!(writer.outstanding(), 0);
        assert_eq!(store.object("f").unwrap(), b"held");
    }

    #[test]
    fn sync_surfaces_failed_append() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.inject_fault(StoreOp::Append, "f");

        writer.append(b"lost").unwrap();
        writer.append(b"kept").unwrap();

        let err = writer.sync().unwrap_err();
        assert!(matches!(err, EnvError::Io { op: "WritableFile::sync", .. }));
        assert_eq!(writer.outstanding(), 0);

        // The failure is reported once.
        writer.sync().unwrap();
    }

    #[test]
    fn flush_is_a_hint_and_keeps_failures() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.inject_fault(StoreOp::Append, "f");

        writer.append(b"x").unwrap();
        // Let the applier fail the append before flushing.
        thread::sleep(Duration::from_millis(20));
        writer.flush().unwrap();
        assert_eq!(store.flush_hints(), 1);

        assert!(writer.sync().is_err());
    }

    #[test]
    fn flush_does_not_block() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.pause();
        writer.append(b"x").unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.outstanding(), 1);
        store.resume();
        writer.sync().unwrap();
    }

    #[test]
    fn close_performs_no_io_and_rejects_writes() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        writer.append(b"abc").unwrap();
        writer.sync().unwrap();

        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(writer.append(b"more"), Err(EnvError::Closed { .. })));
        assert!(matches!(writer.sync(), Err(EnvError::Closed { .. })));
        // Closing twice is fine.
        writer.close().unwrap();
        assert_eq!(store.object("f").unwrap(), b"abc");
    }

    #[test]
    fn close_releases_unacknowledged() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        store.pause();
        writer.append(b"pending").unwrap();
        writer.close().unwrap();
        assert_eq!(writer.outstanding(), 0);

        store.resume();
        // The backend still applies what was issued.
        let c = store.append("f", Vec::new()).unwrap();
        c.wait().unwrap();
        assert_eq!(store.object("f").unwrap(), b"pending");
    }

    #[test]
    fn sync_on_close_surfaces_failures() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = AppendWriter::open(store.clone(), "f", WriteMode::Truncate, true).unwrap();
        store.inject_fault(StoreOp::Append, "f");
        writer.append(b"x").unwrap();
        assert!(writer.close().is_err());
        assert!(writer.is_closed());
    }

    #[test]
    fn empty_append_is_not_issued() {
        let store = Arc::new(MemoryStore::new());
        let mut writer = open(&store, "f");
        writer.append(b"").unwrap();
        assert_eq!(writer.outstanding(), 0);
    }
}
