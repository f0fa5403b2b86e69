// Path: crates/types/src/app/field.rs
//! Quantum fields governed by value-adjustment proposals.

use crate::app::governance::{next_count, GovernedEntity};
use crate::app::AccountId;
use crate::error::RegistryError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A registered quantum field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QuantumField {
    /// Human-readable description.
    pub description: String,
    /// The governed value.
    pub current_value: i128,
    /// The reference value recorded at registration.
    pub baseline_value: i128,
    /// The stability index recorded at registration.
    pub stability_index: u128,
    /// The number of approved adjustments.
    pub adjustment_count: u128,
    /// The principal that registered the field.
    pub registered_by: AccountId,
    /// The registration height.
    pub registered_at: u64,
}

impl GovernedEntity for QuantumField {
    type Value = i128;

    const KIND: &'static str = "field";

    fn governed_value(&self) -> &i128 {
        &self.current_value
    }

    fn adjustment_count(&self) -> u128 {
        self.adjustment_count
    }

    fn apply_governed_value(&mut self, value: i128) -> Result<(), RegistryError> {
        let count = next_count(self.adjustment_count, "field adjustment count")?;
        self.current_value = value;
        self.adjustment_count = count;
        Ok(())
    }
}
