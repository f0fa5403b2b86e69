// Path: crates/types/src/app/mod.rs
//! Registry data structures shared by every governance registry.

/// Data structures for the quantum field adjustment registry.
pub mod field;
/// Data structures for the fluctuation regulation registry.
pub mod fluctuation;
/// Data structures for the wave/particle duality registry.
pub mod duality;
/// The proposal lifecycle: proposals, tallies, vote receipts and the `GovernedEntity` seam.
pub mod governance;

pub use duality::*;
pub use field::*;
pub use fluctuation::*;
pub use governance::*;

use crate::config::TextLimits;
use crate::error::RegistryError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The principal that invoked an operation.
///
/// Callers are identified by an opaque principal string supplied by the host;
/// no signature or key material is checked.
#[derive(
    Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default,
)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Creates a principal from anything string-like.
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An enumerated state label such as `wave`, `particle` or `superposition`.
///
/// Labels obey the identifier rules (see [`validate_identifier`]).
#[derive(
    Encode, Decode, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug,
)]
#[serde(transparent)]
pub struct StateLabel(pub String);

impl StateLabel {
    /// Creates a label without validating it.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that `value` is a valid identifier.
///
/// Identifiers are non-empty, at most `limits.max_id_len` bytes, made only of
/// printable ASCII with no whitespace and no `:` (the key separator).
pub fn validate_identifier(
    field: &str,
    value: &str,
    limits: &TextLimits,
) -> Result<(), RegistryError> {
    if value.is_empty() {
        return Err(RegistryError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.len() > limits.max_id_len {
        return Err(RegistryError::InvalidArgument(format!(
            "{} exceeds {} characters",
            field, limits.max_id_len
        )));
    }
    if !value.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
        return Err(RegistryError::InvalidArgument(format!(
            "{} '{}' contains characters outside printable ASCII or ':'",
            field, value
        )));
    }
    Ok(())
}

/// Checks that `value` is valid free text: printable ASCII (spaces allowed),
/// at most `limits.max_text_len` bytes. Empty text is accepted.
pub fn validate_text(field: &str, value: &str, limits: &TextLimits) -> Result<(), RegistryError> {
    if value.len() > limits.max_text_len {
        return Err(RegistryError::InvalidArgument(format!(
            "{} exceeds {} characters",
            field, limits.max_text_len
        )));
    }
    if !value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
        return Err(RegistryError::InvalidArgument(format!(
            "{} contains non-printable or non-ASCII characters",
            field
        )));
    }
    Ok(())
}
