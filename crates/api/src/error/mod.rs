// Path: crates/api/src/error/mod.rs
// Re-export all core error types from the central types crate.
pub use qgov_types::error::{ErrorCode, ErrorKind, RegistryError, StateError};
pub use qgov_types::Result;
