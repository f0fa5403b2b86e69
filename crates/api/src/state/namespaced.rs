// Path: crates/api/src/state/namespaced.rs

//! State access wrappers that confine a registry to its own keyspace.

use crate::state::{StateAccess, StateKVPair, StateKey, StateScanIter};
use qgov_types::error::StateError;
use std::sync::Arc;

/// The root under which every registry namespace lives.
pub const REGISTRY_NAMESPACE_ROOT: &[u8] = b"_registry::";

/// Helper to generate the canonical namespace prefix for a registry.
pub fn registry_namespace_prefix(service_id: &str) -> Vec<u8> {
    format!("_registry::{}::", service_id).into_bytes()
}

/// Prefixes `key` with the namespace, refusing keys that try to address
/// another registry's data directly.
#[inline]
fn qualify(prefix: &[u8], key: &[u8]) -> Result<Vec<u8>, StateError> {
    if key.starts_with(REGISTRY_NAMESPACE_ROOT) {
        return Err(StateError::PermissionDenied(format!(
            "raw registry key '{}' is not addressable from inside a namespace",
            String::from_utf8_lossy(key)
        )));
    }
    Ok([prefix, key].concat())
}

/// Scans the inner store and hands back keys relative to the namespace, so
/// a registry sees the same keys it wrote.
fn scan_relative<'a>(
    inner: &'a dyn StateAccess,
    prefix: &[u8],
    scan_prefix: &[u8],
) -> Result<StateScanIter<'a>, StateError> {
    let effective_prefix = qualify(prefix, scan_prefix)?;
    let strip = prefix.len();
    let iter = inner
        .prefix_scan(&effective_prefix)?
        .map(move |item| -> Result<StateKVPair, StateError> {
            let (key, value) = item?;
            let relative: StateKey = key.get(strip..).map(Arc::from).ok_or_else(|| {
                StateError::Backend("prefix scan returned a key outside its namespace".into())
            })?;
            Ok((relative, value))
        });
    Ok(Box::new(iter))
}

/// A registry's read/write view of the shared store.
///
/// Every key is prefixed with `_registry::{service_id}::`. Keys that already
/// start with `_registry::` are rejected with `PermissionDenied`, so one
/// registry can never reach into another's records.
pub struct NamespacedStateAccess<'a> {
    inner: &'a mut dyn StateAccess,
    prefix: Vec<u8>,
}

impl<'a> NamespacedStateAccess<'a> {
    pub fn new(inner: &'a mut dyn StateAccess, prefix: Vec<u8>) -> Self {
        Self { inner, prefix }
    }
}

impl<'a> StateAccess for NamespacedStateAccess<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.inner.get(&qualify(&self.prefix, key)?)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        let key = qualify(&self.prefix, key)?;
        self.inner.insert(&key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        let key = qualify(&self.prefix, key)?;
        self.inner.delete(&key)
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        let mut puts = Vec::with_capacity(inserts.len());
        for (key, value) in inserts {
            puts.push((qualify(&self.prefix, key)?, value.clone()));
        }
        let removes = deletes
            .iter()
            .map(|key| qualify(&self.prefix, key))
            .collect::<Result<Vec<_>, _>>()?;
        self.inner.batch_apply(&puts, &removes)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        scan_relative(&*self.inner, &self.prefix, prefix)
    }
}

/// The query-side twin of `NamespacedStateAccess`: same key mapping, over a
/// shared borrow, with every write refused as `PermissionDenied`.
pub struct ReadOnlyNamespacedStateAccess<'a> {
    inner: &'a dyn StateAccess,
    prefix: Vec<u8>,
}

impl<'a> ReadOnlyNamespacedStateAccess<'a> {
    pub fn new(inner: &'a dyn StateAccess, prefix: Vec<u8>) -> Self {
        Self { inner, prefix }
    }

    fn refuse(&self, op: &str, key: &[u8]) -> StateError {
        StateError::PermissionDenied(format!(
            "{} of '{}' in read-only view of '{}'",
            op,
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(&self.prefix)
        ))
    }
}

impl<'a> StateAccess for ReadOnlyNamespacedStateAccess<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.inner.get(&qualify(&self.prefix, key)?)
    }

    fn insert(&mut self, key: &[u8], _value: &[u8]) -> Result<(), StateError> {
        Err(self.refuse("insert", key))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        Err(self.refuse("delete", key))
    }

    fn batch_apply(
        &mut self,
        _inserts: &[(Vec<u8>, Vec<u8>)],
        _deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        Err(self.refuse("batch apply", b""))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        scan_relative(self.inner, &self.prefix, prefix)
    }
}
