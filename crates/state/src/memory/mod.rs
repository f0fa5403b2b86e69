// Path: crates/state/src/memory/mod.rs
//! An ordered, in-memory implementation of `StateAccess`.

use qgov_api::state::{prefix_upper_bound, StateAccess, StateKVPair, StateScanIter};
use qgov_types::error::StateError;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A keyed map held in a `BTreeMap`, so scans come back in key order.
///
/// `batch_apply` cannot fail part-way: deletes are applied first, then
/// inserts, and nothing else can observe the store in between because the
/// caller holds `&mut self`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over every stored pair in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.data.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

impl StateAccess for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        log::trace!(
            "[MemoryStore] applying batch: {} inserts, {} deletes",
            inserts.len(),
            deletes.len()
        );
        for key in deletes {
            self.data.remove(key);
        }
        for (key, value) in inserts {
            self.data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let start = Included(prefix.to_vec());
        let end = match prefix_upper_bound(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        let iter = self
            .data
            .range((start, end))
            .map(|(k, v)| -> Result<StateKVPair, StateError> {
                Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice())))
            });
        Ok(Box::new(iter))
    }
}
