// Path: crates/services/src/field_consensus/mod.rs
//! The quantum field adjustment consensus registry.
//!
//! Fields carry a signed `current_value` that only changes through an
//! approved proposal.

use crate::governance::{
    decode_params, CreateProposalParams, GovernanceEngine, ProposalIdParams, VoteParams,
};
use parity_scale_codec::{Decode, Encode};
use qgov_api::context::CallContext;
use qgov_api::services::RegistryService;
use qgov_api::state::StateAccess;
use qgov_types::app::{validate_text, Proposal, QuantumField, TallyResult};
use qgov_types::codec;
use qgov_types::config::RegistryConfig;
use qgov_types::error::RegistryError;
use serde::{Deserialize, Serialize};

/// The registry id, and with it the state namespace.
pub const FIELD_CONSENSUS_SERVICE_ID: &str = "field_consensus";

// --- Service Method Parameter Structs ---

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RegisterFieldParams {
    pub field_id: String,
    pub description: String,
    pub initial_value: i128,
    pub baseline_value: i128,
    pub stability_index: u128,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct FieldIdParams {
    pub field_id: String,
}

const METHODS: &[&str] = &[
    "register-field@v1",
    "get-field@v1",
    "create-proposal@v1",
    "vote-on-proposal@v1",
    "finalize-proposal@v1",
    "finalize-due@v1",
    "get-proposal@v1",
    "list-proposals@v1",
    "get-vote@v1",
    "list-votes@v1",
];

#[derive(Debug, Clone)]
pub struct FieldConsensusService {
    engine: GovernanceEngine<QuantumField>,
}

impl FieldConsensusService {
    pub fn new(engine: GovernanceEngine<QuantumField>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(GovernanceEngine::new(config.limits, config.voting))
    }

    pub fn engine(&self) -> &GovernanceEngine<QuantumField> {
        &self.engine
    }

    pub fn register_field(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RegisterFieldParams,
    ) -> Result<(), RegistryError> {
        validate_text("description", &params.description, self.engine.limits())?;
        let field = QuantumField {
            description: params.description,
            current_value: params.initial_value,
            baseline_value: params.baseline_value,
            stability_index: params.stability_index,
            adjustment_count: 0,
            registered_by: ctx.caller.clone(),
            registered_at: ctx.block_height,
        };
        self.engine.register_entity(state, &params.field_id, &field)
    }

    pub fn get_field(
        &self,
        state: &dyn StateAccess,
        field_id: &str,
    ) -> Result<Option<QuantumField>, RegistryError> {
        self.engine.get_entity(state, field_id)
    }

    pub fn create_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: CreateProposalParams<i128>,
    ) -> Result<String, RegistryError> {
        self.engine.create_proposal(state, ctx, params)
    }

    pub fn vote_on_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: VoteParams,
    ) -> Result<TallyResult, RegistryError> {
        self.engine.cast_vote(state, ctx, params)
    }

    pub fn finalize_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: ProposalIdParams,
    ) -> Result<bool, RegistryError> {
        self.engine.finalize(state, ctx, &params.proposal_id)
    }

    pub fn get_proposal(
        &self,
        state: &dyn StateAccess,
        proposal_id: &str,
    ) -> Result<Option<Proposal<i128>>, RegistryError> {
        self.engine.get_proposal(state, proposal_id)
    }
}

impl RegistryService for FieldConsensusService {
    fn id(&self) -> &str {
        FIELD_CONSENSUS_SERVICE_ID
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &CallContext,
    ) -> Result<Vec<u8>, RegistryError> {
        match method {
            "register-field@v1" => {
                let p: RegisterFieldParams = decode_params(method, params)?;
                self.register_field(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-field@v1" => {
                let p: FieldIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(&self.get_field(state, &p.field_id)?))
            }
            _ => self
                .engine
                .dispatch(state, method, params, ctx)?
                .ok_or_else(|| {
                    RegistryError::InvalidArgument(format!(
                        "Registry '{}' does not support method '{}'",
                        FIELD_CONSENSUS_SERVICE_ID, method
                    ))
                }),
        }
    }
}
