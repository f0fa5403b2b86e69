// Path: crates/api/src/state/mod.rs
//! Core traits for state management.
//!
//! This module defines the interfaces the registries use to reach their data:
//! - `StateAccess`: basic key-value store operations.
//! - `StateOverlay`: a copy-on-write buffer that turns a sequence of writes
//!   into one ordered batch, so an operation commits all or nothing.
//! - `NamespacedStateAccess`: confines a registry to its private keyspace.

use qgov_types::error::StateError;
use std::sync::Arc;

// --- Type Aliases for common state patterns ---
/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state, using cheap-to-clone Arcs.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs from the state, in ascending key order.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

mod accessor;
pub mod namespaced;
mod overlay;

pub use accessor::*;
pub use namespaced::{registry_namespace_prefix, NamespacedStateAccess, ReadOnlyNamespacedStateAccess};
pub use overlay::*;

#[cfg(test)]
mod tests;
