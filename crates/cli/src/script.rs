// Path: crates/cli/src/script.rs
//! The JSON script format run by `qgov run`.
//!
//! A script is an object with an optional default `caller` and a list of
//! `steps`. Each step names its operation as a single-key object:
//!
//! ```json
//! {
//!   "caller": "deployer",
//!   "steps": [
//!     { "op": { "register-field": { "field_id": "higgs-field-001", "description": "",
//!                                    "initial_value": 246, "baseline_value": 246,
//!                                    "stability_index": 95 } } },
//!     { "op": { "advance": { "blocks": 1 } } },
//!     { "registry": "field", "caller": "alice",
//!       "op": { "vote-on-proposal": { "proposal_id": "proposal-001",
//!                                      "support": true, "weight": 60 } } }
//!   ]
//! }
//! ```
//!
//! The proposal operations are shared by all registries and need `registry`.

use anyhow::{Context, Result};
use qgov_services::duality::{
    EntityEventIdParams, EntityIdParams, RecordObservationParams, RecordTransitionParams,
    RegisterEntityParams,
};
use qgov_services::field_consensus::{FieldIdParams, RegisterFieldParams};
use qgov_services::fluctuation_regulation::{
    CreatePolicyParams, FluctuationEventIdParams, PolicyIdParams, RecordFluctuationParams,
    RegisterZoneParams, ZoneIdParams,
};
use qgov_services::governance::{
    CreateProposalParams, ProposalIdParams, VoteParams, VoteReceiptParams,
};
use qgov_types::app::StateLabel;
use qgov_types::error::RegistryError;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// The caller used when neither the script nor the step names one.
pub const DEFAULT_CALLER: &str = "deployer";

fn default_caller() -> String {
    DEFAULT_CALLER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_caller")]
    pub caller: String,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(text).context("invalid script")?;
        script.check()?;
        Ok(script)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Rejects proposal steps that do not say which registry they address.
    fn check(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            if step.op.needs_registry() && step.registry.is_none() {
                anyhow::bail!(
                    "step {} ({}) needs a \"registry\" of field, zone or entity",
                    index,
                    step.op.name()
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default)]
    pub caller: Option<String>,
    #[serde(default)]
    pub registry: Option<Registry>,
    pub op: Operation,
}

/// Selects the registry a proposal operation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    Field,
    Zone,
    Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvanceParams {
    pub blocks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Advance(AdvanceParams),

    RegisterField(RegisterFieldParams),
    GetField(FieldIdParams),

    RegisterZone(RegisterZoneParams),
    GetZone(ZoneIdParams),
    RecordFluctuation(RecordFluctuationParams),
    GetFluctuationEvent(FluctuationEventIdParams),
    CreatePolicy(CreatePolicyParams),
    GetPolicy(PolicyIdParams),

    RegisterEntity(RegisterEntityParams),
    GetEntity(EntityIdParams),
    RecordObservation(RecordObservationParams),
    GetObservation(EntityEventIdParams),
    RecordTransition(RecordTransitionParams),
    GetTransition(EntityEventIdParams),

    CreateProposal(CreateProposalParams<ProposedValue>),
    VoteOnProposal(VoteParams),
    FinalizeProposal(ProposalIdParams),
    FinalizeDue(NoParams),
    GetProposal(ProposalIdParams),
    ListProposals(NoParams),
    GetVote(VoteReceiptParams),
    ListVotes(ProposalIdParams),
}

impl Operation {
    /// The kebab-case name used in scripts and outcomes.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance(_) => "advance",
            Self::RegisterField(_) => "register-field",
            Self::GetField(_) => "get-field",
            Self::RegisterZone(_) => "register-zone",
            Self::GetZone(_) => "get-zone",
            Self::RecordFluctuation(_) => "record-fluctuation",
            Self::GetFluctuationEvent(_) => "get-fluctuation-event",
            Self::CreatePolicy(_) => "create-policy",
            Self::GetPolicy(_) => "get-policy",
            Self::RegisterEntity(_) => "register-entity",
            Self::GetEntity(_) => "get-entity",
            Self::RecordObservation(_) => "record-observation",
            Self::GetObservation(_) => "get-observation",
            Self::RecordTransition(_) => "record-transition",
            Self::GetTransition(_) => "get-transition",
            Self::CreateProposal(_) => "create-proposal",
            Self::VoteOnProposal(_) => "vote-on-proposal",
            Self::FinalizeProposal(_) => "finalize-proposal",
            Self::FinalizeDue(_) => "finalize-due",
            Self::GetProposal(_) => "get-proposal",
            Self::ListProposals(_) => "list-proposals",
            Self::GetVote(_) => "get-vote",
            Self::ListVotes(_) => "list-votes",
        }
    }

    pub fn needs_registry(&self) -> bool {
        matches!(
            self,
            Self::CreateProposal(_)
                | Self::VoteOnProposal(_)
                | Self::FinalizeProposal(_)
                | Self::FinalizeDue(_)
                | Self::GetProposal(_)
                | Self::ListProposals(_)
                | Self::GetVote(_)
                | Self::ListVotes(_)
        )
    }
}

/// A proposed value as written in a script: a JSON integer or a string.
///
/// It is narrowed to the governed type of the addressed registry when the
/// step runs. JSON numbers outside the 64-bit range arrive as floats and are
/// refused; such amounts are written as decimal strings (`"18446744073709551616"`),
/// which the numeric registries parse and the entity registry keeps as a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposedValue {
    Signed(i128),
    Unsigned(u128),
    Label(String),
}

impl ProposedValue {
    pub fn to_signed(&self) -> Result<i128, RegistryError> {
        match self {
            Self::Signed(v) => Ok(*v),
            Self::Unsigned(v) => i128::try_from(*v).map_err(|_| out_of_range(self, "a signed value")),
            Self::Label(text) => text.parse().map_err(|_| out_of_range(self, "a signed value")),
        }
    }

    pub fn to_unsigned(&self) -> Result<u128, RegistryError> {
        match self {
            Self::Unsigned(v) => Ok(*v),
            Self::Signed(v) => u128::try_from(*v).map_err(|_| out_of_range(self, "an unsigned value")),
            Self::Label(text) => text
                .parse()
                .map_err(|_| out_of_range(self, "an unsigned value")),
        }
    }

    pub fn to_label(&self) -> Result<StateLabel, RegistryError> {
        match self {
            Self::Label(label) => Ok(StateLabel::new(label.as_str())),
            _ => Err(out_of_range(self, "a state label")),
        }
    }
}

fn out_of_range(value: &ProposedValue, expected: &str) -> RegistryError {
    RegistryError::InvalidArgument(format!("proposed value {:?} is not {}", value, expected))
}

impl<'de> Deserialize<'de> for ProposedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProposedValueVisitor;

        impl<'de> Visitor<'de> for ProposedValueVisitor {
            type Value = ProposedValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a state label")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ProposedValue::Signed(v.into()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
                Ok(ProposedValue::Signed(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ProposedValue::Unsigned(v.into()))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
                Ok(ProposedValue::Unsigned(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Err(E::custom(format!(
                    "proposed value {} is not a 64-bit integer; write larger amounts as a decimal string",
                    v
                )))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ProposedValue::Label(v.to_owned()))
            }
        }

        deserializer.deserialize_any(ProposedValueVisitor)
    }
}
