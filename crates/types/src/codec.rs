// crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for all registry state.
//!
//! Every record written to a store (entities, proposals, vote receipts, domain
//! events) and every parameter struct crossing the service ABI goes through
//! these two functions, so that the same logical value always has exactly one
//! byte representation. The format is SCALE (`parity-scale-codec`).

use crate::error::StateError;
use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical SCALE byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Vec<u8> {
    v.encode()
}

/// Decodes a value from its canonical byte representation.
///
/// Trailing bytes are rejected, so a record can never be silently
/// reinterpreted as a shorter type.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, StateError> {
    T::decode_all(&mut &*b).map_err(|e| StateError::Decode(format!("canonical decode failed: {}", e)))
}
