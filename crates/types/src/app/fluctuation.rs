// Path: crates/types/src/app/fluctuation.rs
//! Fluctuation zones, their event log and regulation policies.

use crate::app::governance::{next_count, GovernedEntity};
use crate::app::AccountId;
use crate::error::RegistryError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The regulation status of a zone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Fluctuations are within bounds or have been regulated.
    Active,
    /// An unregulated fluctuation exceeded the zone's maximum amplitude.
    Unstable,
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneStatus::Active => f.write_str("active"),
            ZoneStatus::Unstable => f.write_str("unstable"),
        }
    }
}

/// A registered vacuum fluctuation zone. Its `regulation_level` is governed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FluctuationZone {
    /// Human-readable description.
    pub description: String,
    /// The largest amplitude the zone tolerates without regulation.
    pub max_amplitude: u128,
    /// The reference energy recorded at registration.
    pub baseline_energy: u128,
    /// The governed regulation level.
    pub regulation_level: u128,
    /// The current regulation status.
    pub status: ZoneStatus,
    /// The number of approved regulation-level adjustments.
    pub adjustment_count: u128,
    /// The number of recorded fluctuation events.
    pub event_count: u128,
    /// The principal that registered the zone.
    pub registered_by: AccountId,
    /// The registration height.
    pub registered_at: u64,
}

impl FluctuationZone {
    /// Applies the side effect of a recorded fluctuation.
    ///
    /// A regulated event always leaves the zone `Active`; an unregulated one
    /// marks it `Unstable` when its amplitude exceeds `max_amplitude`.
    pub fn absorb(&mut self, event: &FluctuationEvent) -> Result<(), RegistryError> {
        let count = next_count(self.event_count, "zone event count")?;
        if event.regulated {
            self.status = ZoneStatus::Active;
        } else if event.amplitude > self.max_amplitude {
            self.status = ZoneStatus::Unstable;
        }
        self.event_count = count;
        Ok(())
    }
}

impl GovernedEntity for FluctuationZone {
    type Value = u128;

    const KIND: &'static str = "zone";

    fn governed_value(&self) -> &u128 {
        &self.regulation_level
    }

    fn adjustment_count(&self) -> u128 {
        self.adjustment_count
    }

    fn apply_governed_value(&mut self, value: u128) -> Result<(), RegistryError> {
        let count = next_count(self.adjustment_count, "zone adjustment count")?;
        self.regulation_level = value;
        self.adjustment_count = count;
        Ok(())
    }
}

/// An immutable record of one fluctuation in a zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FluctuationEvent {
    /// The observed amplitude.
    pub amplitude: u128,
    /// The signed energy change.
    pub energy_delta: i128,
    /// Whether the fluctuation was regulated.
    pub regulated: bool,
    /// Free-text outcome.
    pub outcome: String,
    /// The principal that recorded the event.
    pub recorded_by: AccountId,
    /// The recording height.
    pub recorded_at: u64,
}

/// A regulation policy. Policies are write-once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RegulationPolicy {
    /// Human-readable description.
    pub description: String,
    /// The amplitude above which the policy intervenes.
    pub threshold_amplitude: u128,
    /// The intervention method label.
    pub intervention_method: String,
    /// Blocks to wait between interventions.
    pub cooldown_period: u128,
    /// Policies are created active.
    pub active: bool,
    /// The principal that created the policy.
    pub created_by: AccountId,
    /// The creation height.
    pub created_at: u64,
}
