//! Configuration types for syskit.
//!
//! This crate provides the configuration used by the syskit tools, read from
//! `.syskit/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
