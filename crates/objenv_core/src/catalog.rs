//! Namespace queries over the flat object namespace.
//!
//! Directories do not exist in the backend. A name such as `db/000001.log`
//! is a single key; `db` is a virtual directory recognised only by prefix
//! when listing.

use crate::error::{EnvError, EnvResult};
use crate::BackendHandle;

/// Existence, size, removal and listing of objects.
pub struct Catalog {
    store: BackendHandle,
    separator: char,
}

impl Catalog {
    /// Creates a catalog over `store`.
    pub fn new(store: BackendHandle, separator: char) -> Self {
        Self { store, separator }
    }

    /// Returns true if `name` exists.
    ///
    /// Any stat failure counts as absent.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        match self.store.stat(name) {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                tracing::warn!(name, error = %e, "stat failed, reporting file as absent");
                false
            }
        }
    }

    /// Returns the size of `name` in bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Io` if the stat fails.
    pub fn size(&self, name: &str) -> EnvResult<u64> {
        self.store
            .stat(name)
            .map(|stat| stat.size)
            .map_err(|e| EnvError::from_store("Env::file_size", name, e))
    }

    /// Removes `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object is already gone, `Io` otherwise.
    pub fn delete(&self, name: &str) -> EnvResult<()> {
        self.store
            .remove(name)
            .map_err(|e| EnvError::from_store("Env::remove_file", name, e))
    }

    /// Returns the names under `dir`, relative to it.
    ///
    /// An empty `dir` lists the whole namespace. Order is backend-defined.
    ///
    /// # Errors
    ///
    /// Returns `Io` if enumeration fails.
    pub fn children(&self, dir: &str) -> EnvResult<Vec<String>> {
        let keys = self
            .store
            .list()
            .map_err(|e| EnvError::from_store("Env::children", dir, e))?;

        let prefix = self.dir_prefix(dir);
        Ok(keys
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(prefix.as_str())
                    .filter(|rest| !rest.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }

    /// `dir` with exactly one trailing separator, or empty for the root.
    fn dir_prefix(&self, dir: &str) -> String {
        let trimmed = dir.trim_end_matches(self.separator);
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}{}", self.separator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objenv_store::{MemoryStore, ObjectStore, StoreOp};
    use std::sync::Arc;

    fn catalog(store: &Arc<MemoryStore>) -> Catalog {
        Catalog::new(store.clone(), '/')
    }

    #[test]
    fn exists_tracks_creation() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(&store);
        assert!(!catalog.exists("a.log"));
        store.write_full("a.log", b"x").unwrap();
        assert!(catalog.exists("a.log"));
    }

    #[test]
    fn exists_swallows_errors() {
        let store = Arc::new(MemoryStore::with_objects([("a.log", b"x".to_vec())]));
        store.inject_fault(StoreOp::Stat, "a.log");
        assert!(!catalog(&store).exists("a.log"));
    }

    #[test]
    fn size_reports_not_found() {
        let store = Arc::new(MemoryStore::with_objects([("a.log", b"abc".to_vec())]));
        let catalog = catalog(&store);
        assert_eq!(catalog.size("a.log").unwrap(), 3);
        assert!(catalog.size("b.log").unwrap_err().is_not_found());
    }

    #[test]
    fn size_reports_io_failure() {
        let store = Arc::new(MemoryStore::with_objects([("a.log", b"abc".to_vec())]));
        store.inject_fault(StoreOp::Stat, "a.log");
        assert!(matches!(
            catalog(&store).size("a.log"),
            Err(EnvError::Io { .. })
        ));
    }

    #[test]
    fn delete_twice_is_not_found() {
        let store = Arc::new(MemoryStore::with_objects([("a.log", b"abc".to_vec())]));
        let catalog = catalog(&store);
        catalog.delete("a.log").unwrap();
        assert!(catalog.delete("a.log").unwrap_err().is_not_found());
    }

    #[test]
    fn children_strip_prefix() {
        let store = Arc::new(MemoryStore::with_objects([
            ("db/000001.log", Vec::new()),
            ("db/CURRENT", Vec::new()),
            ("other/LOCK", Vec::new()),
            ("dbx/MANIFEST", Vec::new()),
        ]));
        let catalog = catalog(&store);

        let mut names = catalog.children("db").unwrap();
        names.sort();
        assert_eq!(names, vec!["000001.log", "CURRENT"]);

        let mut names = catalog.children("db/").unwrap();
        names.sort();
        assert_eq!(names, vec!["000001.log", "CURRENT"]);
    }

    #[test]
    fn children_of_root_lists_everything() {
        let store = Arc::new(MemoryStore::with_objects([
            ("a", Vec::new()),
            ("b/c", Vec::new()),
        ]));
        let mut names = catalog(&store).children("").unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b/c"]);
    }

    #[test]
    fn children_keep_nested_paths() {
        let store = Arc::new(MemoryStore::with_objects([("db/lost/000003.log", Vec::new())]));
        assert_eq!(
            catalog(&store).children("db").unwrap(),
            vec!["lost/000003.log"]
        );
    }

    #[test]
    fn children_surfaces_list_failure() {
        let store = Arc::new(MemoryStore::new());
        store.inject_fault(StoreOp::List, "");
        assert!(catalog(&store).children("db").is_err());
    }
}
