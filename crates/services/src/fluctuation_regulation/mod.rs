// Path: crates/services/src/fluctuation_regulation/mod.rs
//! The vacuum fluctuation regulation registry.
//!
//! Zones govern their `regulation_level` through proposals. Fluctuation
//! events and regulation policies are write-once records.

use crate::events::EventLog;
use crate::governance::{
    decode_params, CreateProposalParams, GovernanceEngine, ProposalIdParams, VoteParams,
};
use parity_scale_codec::{Decode, Encode};
use qgov_api::context::CallContext;
use qgov_api::services::RegistryService;
use qgov_api::state::{get_decoded, put_encoded, StateAccess};
use qgov_telemetry::governance_metrics;
use qgov_types::app::{
    validate_identifier, validate_text, FluctuationEvent, FluctuationZone, Proposal,
    RegulationPolicy, TallyResult, ZoneStatus,
};
use qgov_types::codec;
use qgov_types::config::RegistryConfig;
use qgov_types::error::RegistryError;
use qgov_types::keys::policy_key;
use serde::{Deserialize, Serialize};

pub const FLUCTUATION_REGULATION_SERVICE_ID: &str = "fluctuation_regulation";

const FLUCTUATIONS: EventLog = EventLog::new("fluctuation");

// --- Service Method Parameter Structs ---

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RegisterZoneParams {
    pub zone_id: String,
    pub description: String,
    pub max_amplitude: u128,
    pub baseline_energy: u128,
    pub regulation_level: u128,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ZoneIdParams {
    pub zone_id: String,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RecordFluctuationParams {
    pub zone_id: String,
    pub event_id: String,
    pub amplitude: u128,
    pub energy_delta: i128,
    pub regulated: bool,
    pub outcome: String,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct FluctuationEventIdParams {
    pub zone_id: String,
    pub event_id: String,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CreatePolicyParams {
    pub policy_id: String,
    pub description: String,
    pub threshold_amplitude: u128,
    pub intervention_method: String,
    pub cooldown_period: u128,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct PolicyIdParams {
    pub policy_id: String,
}

const METHODS: &[&str] = &[
    "register-zone@v1",
    "get-zone@v1",
    "record-fluctuation@v1",
    "get-fluctuation-event@v1",
    "create-policy@v1",
    "get-policy@v1",
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
pub struct FluctuationRegulationService {
    engine: GovernanceEngine<FluctuationZone>,
}

impl FluctuationRegulationService {
    pub fn new(engine: GovernanceEngine<FluctuationZone>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(GovernanceEngine::new(config.limits, config.voting))
    }

    pub fn engine(&self) -> &GovernanceEngine<FluctuationZone> {
        &self.engine
    }

    pub fn register_zone(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RegisterZoneParams,
    ) -> Result<(), RegistryError> {
        validate_text("description", &params.description, self.engine.limits())?;
        let zone = FluctuationZone {
            description: params.description,
            max_amplitude: params.max_amplitude,
            baseline_energy: params.baseline_energy,
            regulation_level: params.regulation_level,
            status: ZoneStatus::Active,
            adjustment_count: 0,
            event_count: 0,
            registered_by: ctx.caller.clone(),
            registered_at: ctx.block_height,
        };
        self.engine.register_entity(state, &params.zone_id, &zone)
    }

    pub fn get_zone(
        &self,
        state: &dyn StateAccess,
        zone_id: &str,
    ) -> Result<Option<FluctuationZone>, RegistryError> {
        self.engine.get_entity(state, zone_id)
    }

    /// Appends a fluctuation event to a zone's log and updates the zone status.
    ///
    /// The zone's `regulation_level` and `adjustment_count` are never touched.
    pub fn record_fluctuation(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: RecordFluctuationParams,
    ) -> Result<(), RegistryError> {
        let limits = self.engine.limits();
        validate_identifier("zone id", &params.zone_id, limits)?;
        validate_identifier("event id", &params.event_id, limits)?;
        validate_text("outcome", &params.outcome, limits)?;

        let mut zone = self.engine.require_entity(state, &params.zone_id)?;
        let event = FluctuationEvent {
            amplitude: params.amplitude,
            energy_delta: params.energy_delta,
            regulated: params.regulated,
            outcome: params.outcome,
            recorded_by: ctx.caller.clone(),
            recorded_at: ctx.block_height,
        };
        let before = zone.status;
        zone.absorb(&event)?;
        FLUCTUATIONS.append(state, &params.zone_id, &params.event_id, &event)?;
        self.engine.put_entity(state, &params.zone_id, &zone)?;

        if zone.status != before {
            log::warn!(
                "[Regulation] Zone '{}' is now {} after event '{}' (amplitude {})",
                params.zone_id,
                zone.status,
                params.event_id,
                event.amplitude
            );
        }
        Ok(())
    }

    pub fn get_fluctuation_event(
        &self,
        state: &dyn StateAccess,
        zone_id: &str,
        event_id: &str,
    ) -> Result<Option<FluctuationEvent>, RegistryError> {
        FLUCTUATIONS.get(state, zone_id, event_id)
    }

    /// Stores a new regulation policy. Policies are created active and never change.
    pub fn create_policy(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: CreatePolicyParams,
    ) -> Result<(), RegistryError> {
        let limits = self.engine.limits();
        validate_identifier("policy id", &params.policy_id, limits)?;
        validate_text("description", &params.description, limits)?;
        validate_text("intervention method", &params.intervention_method, limits)?;

        let key = policy_key(&params.policy_id);
        if state.get(&key)?.is_some() {
            return Err(RegistryError::already_exists("policy", params.policy_id));
        }
        let policy = RegulationPolicy {
            description: params.description,
            threshold_amplitude: params.threshold_amplitude,
            intervention_method: params.intervention_method,
            cooldown_period: params.cooldown_period,
            active: true,
            created_by: ctx.caller.clone(),
            created_at: ctx.block_height,
        };
        put_encoded(state, &key, &policy)?;

        log::info!(
            "[Regulation] Policy '{}' created by {} ({} above amplitude {})",
            params.policy_id,
            policy.created_by,
            policy.intervention_method,
            policy.threshold_amplitude
        );
        governance_metrics().inc_domain_events("policy");
        Ok(())
    }

    pub fn get_policy(
        &self,
        state: &dyn StateAccess,
        policy_id: &str,
    ) -> Result<Option<RegulationPolicy>, RegistryError> {
        Ok(get_decoded(state, &policy_key(policy_id))?)
    }

    pub fn create_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: CreateProposalParams<u128>,
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
    ) -> Result<Option<Proposal<u128>>, RegistryError> {
        self.engine.get_proposal(state, proposal_id)
    }
}

impl RegistryService for FluctuationRegulationService {
    fn id(&self) -> &str {
        FLUCTUATION_REGULATION_SERVICE_ID
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
            "register-zone@v1" => {
                let p: RegisterZoneParams = decode_params(method, params)?;
                self.register_zone(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-zone@v1" => {
                let p: ZoneIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(&self.get_zone(state, &p.zone_id)?))
            }
            "record-fluctuation@v1" => {
                let p: RecordFluctuationParams = decode_params(method, params)?;
                self.record_fluctuation(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-fluctuation-event@v1" => {
                let p: FluctuationEventIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(
                    &self.get_fluctuation_event(state, &p.zone_id, &p.event_id)?,
                ))
            }
            "create-policy@v1" => {
                let p: CreatePolicyParams = decode_params(method, params)?;
                self.create_policy(state, ctx, p)?;
                Ok(Vec::new())
            }
            "get-policy@v1" => {
                let p: PolicyIdParams = decode_params(method, params)?;
                Ok(codec::to_bytes_canonical(&self.get_policy(state, &p.policy_id)?))
            }
            _ => self
                .engine
                .dispatch(state, method, params, ctx)?
                .ok_or_else(|| {
                    RegistryError::InvalidArgument(format!(
                        "Registry '{}' does not support method '{}'",
                        FLUCTUATION_REGULATION_SERVICE_ID, method
                    ))
                }),
        }
    }
}
