//! # ObjEnv Store
//!
//! The keyed-object backend consumed by the ObjEnv adapter.
//!
//! Object stores are **flat namespaces of opaque byte objects**. They know
//! nothing about files, directories or the storage engine sitting on top of
//! the adapter.
//!
//! ## Design Principles
//!
//! - Objects are addressed by a string key; there is no hierarchy
//! - Appends are asynchronous and acknowledged through a [`Completion`]
//! - Appends submitted through one store are applied in submission order
//! - Stores must be `Send + Sync`; one handle is shared by every adapter object
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing, with acknowledgement control and fault injection
//! - [`DirStore`] - One file per object under a root directory
//!
//! ## Example
//!
//! ```rust
//! use objenv_store::{MemoryStore, ObjectStore};
//!
//! let store = MemoryStore::new();
//! store.create("000001.log", false).unwrap();
//! store.append("000001.log", b"hello".to_vec()).unwrap().wait().unwrap();
//! assert_eq!(store.read("000001.log", 0, 16).unwrap(), b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod dir;
mod error;
mod memory;
mod store;

pub use completion::{Completion, CompletionSender};
pub use dir::DirStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{ObjectStat, ObjectStore, StoreOp};
