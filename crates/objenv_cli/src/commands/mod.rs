//! CLI command implementations.

pub mod objects;
pub mod smoke;
