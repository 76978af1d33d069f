//! Directory-backed object store for persistent storage.

use crate::completion::Completion;
use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectStat, ObjectStore};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Prefix of in-flight `write_full` temp files; never listed.
const TEMP_PREFIX: &str = ".objenv-tmp-";

/// An object store keeping one file per object in a single directory.
///
/// Keys are escaped so the namespace stays flat on disk: `%`, `/` and a
/// leading `.` are percent-encoded.
///
/// # Durability
///
/// - Appends are written and `sync_data`'d inline; the returned
///   [`Completion`] has already resolved
/// - `write_full` writes a temp file, syncs it and renames it over the target
///
/// # Example
///
/// ```no_run
/// use objenv_store::{DirStore, ObjectStore};
/// use std::path::Path;
///
/// let store = DirStore::open(Path::new("objects")).unwrap();
/// store.append("000001.log", b"record".to_vec()).unwrap().wait().unwrap();
/// ```
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    next_token: AtomicU64,
}

impl DirStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or is not a
    /// directory.
    pub fn open(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        if !root.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", root.display()),
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
            next_token: AtomicU64::new(1),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(encode_key(key)))
    }

    fn append_inline(&self, path: &Path, key: &str, data: &[u8]) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| map_io(key, e))?;
        file.write_all(data)?;
        file.sync_data()?;
        Ok(())
    }
}

impl ObjectStore for DirStore {
    fn read(&self, key: &str, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        let path = self.object_path(key)?;
        let mut file = File::open(&path).map_err(|e| map_io(key, e))?;
        let size = file.metadata()?.len();
        if offset >= size {
            return Ok(Vec::new());
        }
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = Vec::with_capacity(len.min(1 << 20));
        file.take(len as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn create(&self, key: &str, exclusive: bool) -> StoreResult<()> {
        let path = self.object_path(key)?;
        let mut options = OpenOptions::new();
        options.write(true);
        if exclusive {
            options.create_new(true);
        } else {
            options.create(true).truncate(false);
        }
        match options.open(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StoreError::AlreadyExists {
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn append(&self, key: &str, data: Vec<u8>) -> StoreResult<Completion> {
        let path = self.object_path(key)?;
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let result = self.append_inline(&path, key, &data);
        Ok(Completion::ready(token, result))
    }

    fn flush_async(&self) -> StoreResult<()> {
        // Appends are synced inline.
        Ok(())
    }

    fn stat(&self, key: &str) -> StoreResult<ObjectStat> {
        let path = self.object_path(key)?;
        let metadata = fs::metadata(&path).map_err(|e| map_io(key, e))?;
        Ok(ObjectStat {
            size: metadata.len(),
            mtime: metadata.modified()?,
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.object_path(key)?;
        fs::remove_file(&path).map_err(|e| map_io(key, e))
    }

    fn write_full(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.object_path(key)?;
        let temp_path = self
            .root
            .join(format!("{TEMP_PREFIX}{}", Uuid::new_v4().simple()));

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(e));
        }
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::warn!(path = ?entry.path(), "skipping non-UTF-8 object file");
                continue;
            };
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            match decode_key(name) {
                Some(key) => keys.push(key),
                None => tracing::warn!(file = name, "skipping undecodable object file"),
            }
        }
        Ok(keys)
    }
}

fn map_io(key: &str, e: io::Error) -> StoreError {
    if e.kind() == io::ErrorKind::NotFound {
        StoreError::not_found(key)
    } else {
        StoreError::Io(e)
    }
}

/// Escapes a key into a single flat file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '.' if i == 0 => out.push_str("%2E"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let mut out = Vec::with_capacity(name.len());
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
