// Path: crates/types/src/app/duality.rs
//! Quantum entities with a wave/particle state, their observations and transitions.

use crate::app::governance::{next_count, GovernedEntity};
use crate::app::{validate_identifier, AccountId, StateLabel};
use crate::config::TextLimits;
use crate::error::RegistryError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A registered quantum entity. Its `current_state` is governed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QuantumEntity {
    /// Human-readable description.
    pub description: String,
    /// The current state label.
    pub current_state: StateLabel,
    /// Probability (percent) of wave-like behaviour, recorded at registration.
    pub wave_probability: u128,
    /// Stability factor recorded at registration.
    pub stability_factor: u128,
    /// The number of approved state changes.
    pub adjustment_count: u128,
    /// The number of recorded observations.
    pub observation_count: u128,
    /// The number of recorded transitions.
    pub transition_count: u128,
    /// The principal that registered the entity.
    pub registered_by: AccountId,
    /// The registration height.
    pub registered_at: u64,
}

impl QuantumEntity {
    /// An observation collapses the entity into the observed state.
    pub fn observe(&mut self, observation: &Observation) -> Result<(), RegistryError> {
        let count = next_count(self.observation_count, "entity observation count")?;
        self.current_state = observation.observed_state.clone();
        self.observation_count = count;
        Ok(())
    }

    /// A transition moves the entity to its target state.
    pub fn transition(&mut self, transition: &StateTransition) -> Result<(), RegistryError> {
        let count = next_count(self.transition_count, "entity transition count")?;
        self.current_state = transition.to_state.clone();
        self.transition_count = count;
        Ok(())
    }
}

impl GovernedEntity for QuantumEntity {
    type Value = StateLabel;

    const KIND: &'static str = "entity";

    fn validate_value(value: &StateLabel, limits: &TextLimits) -> Result<(), RegistryError> {
        validate_identifier("proposed state", value.as_str(), limits)
    }

    fn governed_value(&self) -> &StateLabel {
        &self.current_state
    }

    fn adjustment_count(&self) -> u128 {
        self.adjustment_count
    }

    fn apply_governed_value(&mut self, value: StateLabel) -> Result<(), RegistryError> {
        let count = next_count(self.adjustment_count, "entity adjustment count")?;
        self.current_state = value;
        self.adjustment_count = count;
        Ok(())
    }
}

/// An immutable record of a measurement of an entity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Observation {
    /// Who observed.
    pub observer_id: String,
    /// The state the entity was observed in.
    pub observed_state: StateLabel,
    /// The measurement technique (e.g. "double-slit").
    pub measurement_type: String,
    /// Certainty of the measurement, in percent.
    pub certainty_level: u128,
    /// The principal that recorded the observation.
    pub recorded_by: AccountId,
    /// The recording height.
    pub recorded_at: u64,
}

/// An immutable record of a state transition of an entity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct StateTransition {
    /// The state before the transition, as reported by the caller.
    pub from_state: StateLabel,
    /// The state after the transition.
    pub to_state: StateLabel,
    /// What caused the transition.
    pub trigger: String,
    /// The signed energy change.
    pub energy_change: i128,
    /// The principal that recorded the transition.
    pub recorded_by: AccountId,
    /// The recording height.
    pub recorded_at: u64,
}
