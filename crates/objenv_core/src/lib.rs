//! # ObjEnv Core
//!
//! A storage-engine file environment emulated on a flat object store.
//!
//! Log-structured engines want files: sequential and positional reads,
//! append-only writes with a sync barrier, rename, listing and locks. Object
//! stores offer keyed objects with ranged reads, asynchronous appends, stat,
//! remove, full overwrite and enumeration. This crate bridges the two:
//!
//! - [`SequentialReader`] / [`RandomAccessReader`] map reads to ranged reads
//! - [`AppendWriter`] issues asynchronous appends and turns `sync` into a wait
//!   on every outstanding acknowledgement
//! - [`Catalog`] answers existence, size and listing queries, emulating
//!   directories by name prefix
//! - [`rename()`] moves objects by copy (not atomic)
//! - [`LockAllocator`] issues advisory lock handles without exclusion
//! - [`ObjectEnv`] ties them together behind the [`Env`] trait
//!
//! All components share one [`BackendHandle`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod env;
mod error;
mod file;
mod lock;
mod reader;
mod rename;
mod util;
mod writer;

use objenv_store::ObjectStore;
use std::sync::Arc;

pub use catalog::Catalog;
pub use config::EnvConfig;
pub use env::{Env, ObjectEnv};
pub use error::{EnvError, EnvResult, RenameStep};
pub use file::{RandomAccessFile, SequentialFile, WritableFile};
pub use lock::{FileLock, LockAllocator};
pub use reader::{RandomAccessReader, SequentialReader};
pub use rename::rename;
pub use util::{read_file_to_vec, write_file};
pub use writer::{AppendWriter, WriteMode};

/// The shared, reference-counted backend session.
///
/// Every reader, writer and catalog holds a clone; the store is released when
/// the last one is dropped.
pub type BackendHandle = Arc<dyn ObjectStore>;

/// Current version of ObjEnv.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
