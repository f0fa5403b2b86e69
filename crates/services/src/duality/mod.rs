// Path: crates/services/src/duality/mod.rs
//! The wave-particle duality registry.
//!
//! An entity's `current_state` is governed by proposals, and also moves when
//! an observation or a state transition is recorded against it.

use crate::events::EventLog;
use crate::governance::{
    decode_params, CreateProposalParams, GovernanceEngine, ProposalIdParams, VoteParams,
};
use parity_scale_codec::{Decode, Encode};
use qgov_api::context::CallContext;
use qgov_api::services::RegistryService;
use qgov_api::state::StateAccess;
use qgov_types::app::{
    validate_identifier, validate_text, Observation, Proposal, QuantumEntity, StateLabel,
    StateTransition, TallyResult,
};
use qgov_types::codec;
use qgov_types::config::RegistryConfig;
use qgov_types::error::RegistryError;
use serde::{Deserialize, Serialize};

pub const DUALITY_SERVICE_ID: &str = "duality";

/// Upper bound of every percentage-valued parameter.
pub const MAX_PERCENT: u128 = 100;

const OBSERVATIONS: EventLog = EventLog::new("observation");
const TRANSITIONS: EventLog = EventLog::new("transition");

// --- Service Method Parameter Structs ---

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RegisterEntityParams {
    pub entity_id: String,
    pub description: String,
    pub initial_state: StateLabel,
    pub wave_probability: u128,
    pub stability_factor: u128,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct EntityIdParams {
    pub entity_id: String,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RecordObservationParams {
    pub entity_id: String,
    pub observation_id: String,
    pub observer_id: String,
    pub observed_state: StateLabel,
    pub measurement_type: String,
    pub certainty_level: u128,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RecordTransitionParams {
    pub entity_id: String,
    pub transition_id: String,
    pub from_state: StateLabel,
    pub to_state: StateLabel,
    pub trigger: String,
    pub energy_change: i128,
}

/// Addresses one observation or transition of an entity.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct EntityEventIdParams {
    pub entity_id: String,
    pub event_id: String,
}

const METHODS: &[&str] = &[
    "register-entity@v1",
    "get-entity@v1",
    "record-observation@v1",
    "get-observation@v1",
    "record-transition@v1",
    "get-transition@v1",
    "create-proposal@v1",
    "vote-on-proposal@v1",
    "finalize-proposal@v1",
    "finalize-due@v1",
    "get-proposal@v1",
    "list-proposals@v1",
    "get-vote@v1",
    "list-votes@v1",
];

fn check_percent(field: &str, value: u128) -> Result<(), RegistryError> {
    if value > MAX_PERCENT {
        return Err(RegistryError::InvalidArgument(format!(
            "{} must be at most {}, got {}",
            field, MAX_PERCENT, value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DualityService {
    engine: GovernanceEngine<QuantumEntity>,
}

impl DualityService {
    pub fn new(engine: GovernanceEngine<QuantumEntity>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(GovernanceEngine::new(config.limits, config.voting))
    }

    pub fn engine(&self) -> &GovernanceEngine<QuantumEntity> {
        &self.engine
    }

    pub fn register_entity(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RegisterEntityParams,
    ) -> Result<(), RegistryError> {
        let limits = self.engine.limits();
        validate_text("description", &params.description, limits)?;
        validate_identifier("initial state", params.initial_state.as_str(), limits)?;
        check_percent("wave probability", params.wave_probability)?;
        let entity = QuantumEntity {
            description: params.description,
            current_state: params.initial_state,
            wave_probability: params.wave_probability,
            stability_factor: params.stability_factor,
            adjustment_count: 0,
            observation_count: 0,
            transition_count: 0,
            registered_by: ctx.caller.clone(),
            registered_at: ctx.block_height,
        };
        self.engine.register_entity(state, &params.entity_id, &entity)
    }

    pub fn get_entity(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
    ) -> Result<Option<QuantumEntity>, RegistryError> {
        self.engine.get_entity(state, entity_id)
    }

    /// Records a measurement and collapses the entity into the observed state.
    pub fn record_observation(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RecordObservationParams,
    ) -> Result<(), RegistryError> {
        let limits = self.engine.limits();
        validate_identifier("entity id", &params.entity_id, limits)?;
        validate_identifier("observation id", &params.observation_id, limits)?;
        validate_identifier("observer id", &params.observer_id, limits)?;
        validate_identifier("observed state", params.observed_state.as_str(), limits)?;
        validate_text("measurement type", &params.measurement_type, limits)?;
        check_percent("certainty level", params.certainty_level)?;

        let mut entity = self.engine.require_entity(state, &params.entity_id)?;
        let observation = Observation {
            observer_id: params.observer_id,
            observed_state: params.observed_state,
            measurement_type: params.measurement_type,
            certainty_level: params.certainty_level,
            recorded_by: ctx.caller.clone(),
            recorded_at: ctx.block_height,
        };
        entity.observe(&observation)?;
        OBSERVATIONS.append(state, &params.entity_id, &params.observation_id, &observation)?;
        self.engine.put_entity(state, &params.entity_id, &entity)?;

        log::debug!(
            "[Duality] Entity '{}' observed as {} by {}",
            params.entity_id,
            entity.current_state,
            observation.observer_id
        );
        Ok(())
    }

    pub fn get_observation(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
        observation_id: &str,
    ) -> Result<Option<Observation>, RegistryError> {
        OBSERVATIONS.get(state, entity_id, observation_id)
    }

    /// Records a state transition and moves the entity to `to_state`.
    ///
    /// `from_state` is kept as reported; it is not checked against the
    /// entity's current state.
    pub fn record_transition(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RecordTransitionParams,
    ) -> Result<(), RegistryError> {
        let limits = self.engine.limits();
        validate_identifier("entity id", &params.entity_id, limits)?;
        validate_identifier("transition id", &params.transition_id, limits)?;
        validate_identifier("from state", params.from_state.as_str(), limits)?;
        validate_identifier("to state", params.to_state.as_str(), limits)?;
        validate_text("trigger", &params.trigger, limits)?;

        let mut entity = self.engine.require_entity(state, &params.entity_id)?;
        let transition = StateTransition {
            from_state: params.from_state,
            to_state: params.to_state,
            trigger: params.trigger,
            energy_change: params.energy_change,
            recorded_by: ctx.caller.clone(),
            recorded_at: ctx.block_height,
        };
        entity.transition(&transition)?;
        TRANSITIONS.append(state, &params.entity_id, &params.transition_id, &transition)?;
        self.engine.put_entity(state, &params.entity_id, &entity)?;

        log::debug!(
            "[Duality] Entity '{}' moved {} -> {} ({})",
            params.entity_id,
            transition.from_state,
            transition.to_state,
            transition.trigger
        );
        Ok(())
    }

    pub fn get_transition(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
        transition_id: &str,
    ) -> Result<Option<StateTransition>, RegistryError> {
        TRANSITIONS.get(state, entity_id, transition_id)
    }

    pub fn create_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: CreateProposalParams<StateLabel>,
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
    ) -> Result<Option<Proposal<StateLabel>>, RegistryError> {
        self.engine.get_proposal(state, proposal_id)
    }
}

impl RegistryService for DualityService {
    fn id(&self) -> &str {
        DUALITY_SERVICE_ID
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
            "register-entity@v1" => {
                let p: RegisterEntityParams = decode_params(method, params)?;
                self.register_entity(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-entity@v1" => {
                let p: EntityIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(&self.get_entity(state, &p.entity_id)?))
            }
            "record-observation@v1" => {
                let p: RecordObservationParams = decode_params(method, params)?;
                self.record_observation(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-observation@v1" => {
                let p: EntityEventIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(
                    &self.get_observation(state, &p.entity_id, &p.event_id)?,
                ))
            }
            "record-transition@v1" => {
                let p: RecordTransitionParams = decode_params(method, params)?;
                self.record_transition(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-transition@v1" => {
                let p: EntityEventIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(
                    &self.get_transition(state, &p.entity_id, &p.event_id)?,
                ))
            }
            _ => self
                .engine
                .dispatch(state, method, params, ctx)?
                .ok_or_else(|| {
                    RegistryError::InvalidArgument(format!(
                        "Registry '{}' does not support method '{}'",
                        DUALITY_SERVICE_ID, method
                    ))
                }),
        }
    }
}
