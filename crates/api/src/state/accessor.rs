// Path: crates/api/src/state/accessor.rs
//! The `StateAccess` trait and typed read/write helpers on top of it.

use crate::state::StateScanIter;
use parity_scale_codec::{Decode, Encode};
use qgov_types::codec;
use qgov_types::error::StateError;

/// Byte-keyed storage as seen by a registry.
///
/// Services only ever see `&dyn StateAccess` / `&mut dyn StateAccess`, so the
/// same registry code runs against the in-memory store, an overlay or a
/// namespaced view.
pub trait StateAccess: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError>;

    /// Removing an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), StateError>;

    /// Applies `deletes`, then `inserts`, as one unit. Implementations must
    /// either apply all of it or none of it.
    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError>;

    /// Every pair whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError>;
}

/// Exclusive upper bound of the keys starting with `prefix`, or `None` when
/// no such bound exists (empty or all-`0xFF` prefix).
///
/// Stores that scan an ordered map use it as the end of a `prefix_scan` range.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|b| *b != 0xFF)?;
    let mut bound = prefix.get(..=last)?.to_vec();
    if let Some(byte) = bound.last_mut() {
        *byte += 1;
    }
    Some(bound)
}

/// Reads and decodes a canonically encoded value.
pub fn get_decoded<T: Decode>(
    state: &dyn StateAccess,
    key: &[u8],
) -> Result<Option<T>, StateError> {
    match state.get(key)? {
        Some(bytes) => codec::from_bytes_canonical(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Encodes a value canonically and writes it.
pub fn put_encoded<T: Encode>(
    state: &mut dyn StateAccess,
    key: &[u8],
    value: &T,
) -> Result<(), StateError> {
    state.insert(key, &codec::to_bytes_canonical(value))
}
