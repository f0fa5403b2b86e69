// Path: crates/api/src/context/mod.rs
//! Defines the stable context for a registry call.

use qgov_types::app::AccountId;

/// Provides read-only context to registry services during a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// The block height observed by the host when the call started.
    /// Every deadline comparison in the call uses this single value.
    pub block_height: u64,
    /// The principal that invoked the call. Recorded as proposer, voter or
    /// registrant; never used for authorization.
    pub caller: AccountId,
}

impl CallContext {
    /// Creates a context for `caller` at `block_height`.
    pub fn new(block_height: u64, caller: AccountId) -> Self {
        Self {
            block_height,
            caller,
        }
    }
}
