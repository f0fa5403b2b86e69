// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay that makes registry operations atomic.

use crate::state::{prefix_upper_bound, StateAccess, StateKVPair, StateScanIter};
use qgov_types::error::StateError;
use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::iter::{Fuse, Peekable};
use std::ops::Bound;
use std::sync::Arc;

/// The writes one registry operation produced, in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub puts: Vec<(Vec<u8>, Vec<u8>)>,
    pub removes: Vec<Vec<u8>>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.removes.is_empty()
    }

    /// Applies the whole set to `target` with a single `batch_apply`.
    pub fn commit_to(&self, target: &mut dyn StateAccess) -> Result<(), StateError> {
        if self.is_empty() {
            return Ok(());
        }
        target.batch_apply(&self.puts, &self.removes)
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Put(Vec<u8>),
    Remove,
}

/// Walks the base scan and the pending writes side by side. A pending entry
/// shadows the base entry with the same key; a pending removal hides it.
struct OverlayScan<'a> {
    base: Peekable<Fuse<StateScanIter<'a>>>,
    pending: Peekable<btree_map::Range<'a, Vec<u8>, Pending>>,
}

impl OverlayScan<'_> {
    fn next_base_first(&mut self) -> Ordering {
        let base = match self.base.peek() {
            Some(Ok((key, _))) => Some(key.as_ref()),
            Some(Err(_)) => return Ordering::Less,
            None => None,
        };
        match (base, self.pending.peek()) {
            (Some(b), Some((p, _))) => b.cmp(p.as_slice()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Iterator for OverlayScan<'_> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_base_first() {
                Ordering::Less => return self.base.next(),
                Ordering::Equal => {
                    // Either both are exhausted or the pending entry shadows the base one.
                    self.base.next();
                }
                Ordering::Greater => {}
            }
            match self.pending.next()? {
                (key, Pending::Put(value)) => {
                    return Some(Ok((Arc::from(key.as_slice()), Arc::from(value.as_slice()))))
                }
                (_, Pending::Remove) => continue,
            }
        }
    }
}

/// Buffers the writes of one operation on top of a read-only base.
///
/// Reads see the buffered writes first. Nothing reaches the base until the
/// owner takes `into_change_set()` and commits it; dropping the overlay
/// discards the operation.
#[derive(Clone)]
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    pending: BTreeMap<Vec<u8>, Pending>,
}

impl<'a> StateOverlay<'a> {
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// The number of distinct keys written or removed so far.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn into_change_set(self) -> ChangeSet {
        let mut changes = ChangeSet::default();
        for (key, entry) in self.pending {
            match entry {
                Pending::Put(value) => changes.puts.push((key, value)),
                Pending::Remove => changes.removes.push(key),
            }
        }
        changes
    }
}

impl StateAccess for StateOverlay<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.pending.get(key) {
            Some(Pending::Put(value)) => Ok(Some(value.clone())),
            Some(Pending::Remove) => Ok(None),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.pending.insert(key.to_vec(), Pending::Put(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.pending.insert(key.to_vec(), Pending::Remove);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.pending.insert(key.clone(), Pending::Remove);
        }
        for (key, value) in inserts {
            self.pending.insert(key.clone(), Pending::Put(value.clone()));
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let upper = match prefix_upper_bound(prefix) {
            Some(bound) => Bound::Excluded(bound),
            None => Bound::Unbounded,
        };
        let pending = self
            .pending
            .range((Bound::Included(prefix.to_vec()), upper))
            .peekable();
        let base = self.base.prefix_scan(prefix)?.fuse().peekable();
        Ok(Box::new(OverlayScan { base, pending }))
    }
}
