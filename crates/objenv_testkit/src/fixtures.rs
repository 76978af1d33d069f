//! Test fixtures and environment helpers.
//!
//! Provides convenience functions for setting up environments over the two
//! bundled stores.

use objenv_core::{EnvConfig, ObjectEnv};
use objenv_store::{DirStore, MemoryStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test environment with automatic cleanup.
pub struct TestEnv {
    /// The environment instance.
    pub env: ObjectEnv,
    /// The memory store behind `env`, for pausing and fault injection.
    pub memory: Option<Arc<MemoryStore>>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestEnv {
    /// Creates an environment over a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        Self::memory_with_config(EnvConfig::default())
    }

    /// Creates an environment over a fresh [`MemoryStore`] with `config`.
    pub fn memory_with_config(config: EnvConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            env: ObjectEnv::with_config(store.clone(), config),
            memory: Some(store),
            _temp_dir: None,
        }
    }

    /// Creates an environment over a [`DirStore`] in a temporary directory.
    pub fn dir() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = DirStore::open(temp_dir.path()).expect("Failed to open dir store");
        Self {
            env: ObjectEnv::new(Arc::new(store)),
            memory: None,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store root if directory-backed.
    pub fn root(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns the memory store, panicking for directory-backed envs.
    pub fn memory_store(&self) -> &MemoryStore {
        self.memory
            .as_deref()
            .expect("environment is not backed by a memory store")
    }
}

impl std::ops::Deref for TestEnv {
    type Target = ObjectEnv;

    fn deref(&self) -> &Self::Target {
        &self.env
    }
}

/// Runs a test with an environment over a fresh memory store.
///
/// # Example
///
/// ```rust
/// use objenv_core::Env;
/// use objenv_testkit::with_memory_env;
///
/// with_memory_env(|env, store| {
///     env.new_writable_file("f").unwrap();
///     assert!(store.object("f").is_some());
/// });
/// ```
pub fn with_memory_env<F, R>(f: F) -> R
where
    F: FnOnce(&ObjectEnv, &MemoryStore) -> R,
{
    let test_env = TestEnv::memory();
    f(&test_env.env, test_env.memory_store())
}

/// Runs a test with an environment over a temporary directory store.
pub fn with_dir_env<F, R>(f: F) -> R
where
    F: FnOnce(&ObjectEnv, &Path) -> R,
{
    let test_env = TestEnv::dir();
    let root = test_env.root().expect("Dir env should have a root");
    f(&test_env.env, root)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use objenv_core::{write_file, Env};

    /// Creates a memory environment holding `count` synced files under `dir`.
    ///
    /// File `i` is named `{dir}/{i:06}.log` and contains `i` as text.
    pub fn populated_env(dir: &str, count: usize) -> TestEnv {
        let test_env = TestEnv::memory();
        for i in 0..count {
            let name = format!("{dir}/{i:06}.log");
            write_file(&test_env.env, &name, i.to_string().as_bytes(), true)
                .expect("Failed to write file");
        }
        assert_eq!(
            test_env.env.children(dir).expect("Failed to list").len(),
            count
        );
        test_env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objenv_core::Env;

    #[test]
    fn test_memory_env() {
        let test_env = TestEnv::memory();
        assert!(test_env.root().is_none());
        assert!(!test_env.file_exists("anything"));
    }

    #[test]
    fn test_dir_env() {
        with_dir_env(|env, root| {
            env.new_writable_file("f").unwrap();
            assert!(root.join("f").exists());
        });
    }

    #[test]
    fn test_populated_scenario() {
        let test_env = scenarios::populated_env("db", 5);
        assert_eq!(test_env.file_size("db/000004.log").unwrap(), 1);
    }
}
