//! # ObjEnv Testkit
//!
//! Test utilities for ObjEnv.
//!
//! This crate provides:
//! - Fixtures that build an [`objenv_core::ObjectEnv`] over a memory or
//!   directory store
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use objenv_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_env() {
//!     with_memory_env(|env, store| {
//!         let mut log = env.new_writable_file("000001.log").unwrap();
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
