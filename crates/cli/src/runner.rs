// Path: crates/cli/src/runner.rs

use crate::script::{Operation, ProposedValue, Registry, Script, Step};
use qgov_api::clock::ManualClock;
use qgov_api::context::CallContext;
use qgov_api::state::StateAccess;
use qgov_services::duality::DUALITY_SERVICE_ID;
use qgov_services::field_consensus::FIELD_CONSENSUS_SERVICE_ID;
use qgov_services::fluctuation_regulation::FLUCTUATION_REGULATION_SERVICE_ID;
use qgov_services::governance::CreateProposalParams;
use qgov_services::{
    DualityService, FieldConsensusService, FluctuationRegulationService, GovernanceEngine,
    RegistryHost,
};
use qgov_state::memory::MemoryStore;
use qgov_types::app::{AccountId, GovernedEntity};
use qgov_types::config::RegistryConfig;
use qgov_types::error::{ErrorCode, RegistryError};
use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::Arc;

/// The result of one script step, printed as one JSON line.
///
/// `result` holds encoded JSON text so that 128-bit amounts keep every digit.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    pub caller: String,
    pub height: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The encoded result of a successful step.
    pub fn result_text(&self) -> Option<&str> {
        self.result.as_deref().map(RawValue::get)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub code: &'static str,
    pub message: String,
}

impl From<RegistryError> for StepError {
    fn from(err: RegistryError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Box<RawValue>, StepError> {
    serde_json::value::to_raw_value(&value).map_err(|e| StepError {
        code: "CLI_ENCODE_ERROR",
        message: e.to_string(),
    })
}

/// Runs script steps against the three registries sharing one in-memory host.
pub struct ScriptRunner {
    host: RegistryHost<MemoryStore>,
    clock: Arc<ManualClock>,
    fields: FieldConsensusService,
    zones: FluctuationRegulationService,
    entities: DualityService,
}

impl ScriptRunner {
    pub fn new(config: &RegistryConfig) -> Self {
        let clock = Arc::new(ManualClock::new(config.clock.start_height));
        Self {
            host: RegistryHost::new(MemoryStore::new(), clock.clone()),
            clock,
            fields: FieldConsensusService::from_config(config),
            zones: FluctuationRegulationService::from_config(config),
            entities: DualityService::from_config(config),
        }
    }

    pub fn height(&self) -> u64 {
        self.host.height()
    }

    /// Runs every step in order. A failing step does not stop the run.
    pub fn run(&self, script: &Script) -> Vec<StepOutcome> {
        script
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.run_step(index, step, &script.caller))
            .collect()
    }

    pub fn run_step(&self, index: usize, step: &Step, default_caller: &str) -> StepOutcome {
        let caller = AccountId::new(step.caller.as_deref().unwrap_or(default_caller));
        let outcome = self.execute(&caller, step);
        let height = self.host.height();
        match &outcome {
            Ok(_) => tracing::debug!(step = index, op = step.op.name(), height, "step succeeded"),
            Err(e) => tracing::info!(
                step = index,
                op = step.op.name(),
                height,
                code = e.code,
                "step failed: {}",
                e.message
            ),
        }
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };
        StepOutcome {
            step: index,
            op: step.op.name(),
            caller: caller.to_string(),
            height,
            result,
            error,
        }
    }

    fn transact<R: Serialize>(
        &self,
        service_id: &str,
        caller: &AccountId,
        f: impl FnOnce(&mut dyn StateAccess, &CallContext) -> Result<R, RegistryError>,
    ) -> Result<Box<RawValue>, StepError> {
        to_json(self.host.transact(service_id, caller, f)?)
    }

    fn query<R: Serialize>(
        &self,
        service_id: &str,
        f: impl FnOnce(&dyn StateAccess) -> Result<R, RegistryError>,
    ) -> Result<Box<RawValue>, StepError> {
        to_json(self.host.query(service_id, f)?)
    }

    fn execute(&self, caller: &AccountId, step: &Step) -> Result<Box<RawValue>, StepError> {
        const FIELD: &str = FIELD_CONSENSUS_SERVICE_ID;
        const ZONE: &str = FLUCTUATION_REGULATION_SERVICE_ID;
        const ENTITY: &str = DUALITY_SERVICE_ID;

        match &step.op {
            Operation::Advance(p) => to_json(self.clock.advance(p.blocks)),

            Operation::RegisterField(p) => self.transact(FIELD, caller, |s, ctx| {
                self.fields.register_field(s, ctx, p.clone())
            }),
            Operation::GetField(p) => self.query(FIELD, |s| self.fields.get_field(s, &p.field_id)),

            Operation::RegisterZone(p) => self.transact(ZONE, caller, |s, ctx| {
                self.zones.register_zone(s, ctx, p.clone())
            }),
            Operation::GetZone(p) => self.query(ZONE, |s| self.zones.get_zone(s, &p.zone_id)),
            Operation::RecordFluctuation(p) => self.transact(ZONE, caller, |s, ctx| {
                self.zones.record_fluctuation(s, ctx, p.clone())
            }),
            Operation::GetFluctuationEvent(p) => self.query(ZONE, |s| {
                self.zones.get_fluctuation_event(s, &p.zone_id, &p.event_id)
            }),
            Operation::CreatePolicy(p) => self.transact(ZONE, caller, |s, ctx| {
                self.zones.create_policy(s, ctx, p.clone())
            }),
            Operation::GetPolicy(p) => self.query(ZONE, |s| self.zones.get_policy(s, &p.policy_id)),

            Operation::RegisterEntity(p) => self.transact(ENTITY, caller, |s, ctx| {
                self.entities.register_entity(s, ctx, p.clone())
            }),
            Operation::GetEntity(p) => {
                self.query(ENTITY, |s| self.entities.get_entity(s, &p.entity_id))
            }
            Operation::RecordObservation(p) => self.transact(ENTITY, caller, |s, ctx| {
                self.entities.record_observation(s, ctx, p.clone())
            }),
            Operation::GetObservation(p) => self.query(ENTITY, |s| {
                self.entities.get_observation(s, &p.entity_id, &p.event_id)
            }),
            Operation::RecordTransition(p) => self.transact(ENTITY, caller, |s, ctx| {
                self.entities.record_transition(s, ctx, p.clone())
            }),
            Operation::GetTransition(p) => self.query(ENTITY, |s| {
                self.entities.get_transition(s, &p.entity_id, &p.event_id)
            }),

            op => match step.registry {
                Some(Registry::Field) => {
                    self.proposal_step(FIELD, self.fields.engine(), caller, op, ProposedValue::to_signed)
                }
                Some(Registry::Zone) => {
                    self.proposal_step(ZONE, self.zones.engine(), caller, op, ProposedValue::to_unsigned)
                }
                Some(Registry::Entity) => self.proposal_step(
                    ENTITY,
                    self.entities.engine(),
                    caller,
                    op,
                    ProposedValue::to_label,
                ),
                None => Err(StepError {
                    code: "CLI_MISSING_REGISTRY",
                    message: format!("{} needs a registry", op.name()),
                }),
            },
        }
    }

    /// Runs one of the shared proposal operations against `engine`.
    fn proposal_step<E: GovernedEntity>(
        &self,
        service_id: &str,
        engine: &GovernanceEngine<E>,
        caller: &AccountId,
        op: &Operation,
        narrow: fn(&ProposedValue) -> Result<E::Value, RegistryError>,
    ) -> Result<Box<RawValue>, StepError> {
        match op {
            Operation::CreateProposal(p) => {
                let params = CreateProposalParams {
                    proposal_id: p.proposal_id.clone(),
                    entity_id: p.entity_id.clone(),
                    proposed_value: narrow(&p.proposed_value)?,
                    justification: p.justification.clone(),
                    vote_threshold_hint: p.vote_threshold_hint,
                    voting_duration: p.voting_duration,
                };
                self.transact(service_id, caller, |s, ctx| {
                    engine.create_proposal(s, ctx, params)
                })
            }
            Operation::VoteOnProposal(p) => {
                self.transact(service_id, caller, |s, ctx| engine.cast_vote(s, ctx, p.clone()))
            }
            Operation::FinalizeProposal(p) => self.transact(service_id, caller, |s, ctx| {
                engine.finalize(s, ctx, &p.proposal_id)
            }),
            Operation::FinalizeDue(_) => {
                self.transact(service_id, caller, |s, ctx| engine.finalize_due(s, ctx))
            }
            Operation::GetProposal(p) => {
                self.query(service_id, |s| engine.get_proposal(s, &p.proposal_id))
            }
            Operation::ListProposals(_) => self.query(service_id, |s| engine.list_proposals(s)),
            Operation::GetVote(p) => {
                self.query(service_id, |s| engine.get_vote(s, &p.proposal_id, p.seq))
            }
            Operation::ListVotes(p) => {
                self.query(service_id, |s| engine.list_votes(s, &p.proposal_id))
            }
            other => Err(StepError {
                code: "CLI_UNSUPPORTED_STEP",
                message: format!("{} is not a proposal operation", other.name()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run(script: Value) -> Vec<StepOutcome> {
        let script = Script::from_json(&script.to_string()).unwrap();
        ScriptRunner::new(&RegistryConfig::default()).run(&script)
    }

    fn result(outcome: &StepOutcome) -> Value {
        serde_json::from_str(outcome.result_text().unwrap()).unwrap()
    }

    #[test]
    fn failures_are_reported_and_the_run_continues() {
        let outcomes = run(json!({
            "steps": [
                { "op": { "get-zone": { "zone_id": "zone-beta" } } },
                { "op": { "record-fluctuation": {
                    "zone_id": "zone-beta", "event_id": "e1", "amplitude": 800,
                    "energy_delta": 50, "regulated": true, "outcome": "" } } },
                { "op": { "advance": { "blocks": 4 } } }
            ]
        }));

        assert_eq!(outcomes.len(), 3);
        assert_eq!(result(&outcomes[0]), Value::Null);
        assert!(!outcomes[1].is_ok());
        assert_eq!(outcomes[1].error.as_ref().unwrap().code, "REGISTRY_NOT_FOUND");
        assert_eq!(result(&outcomes[2]), json!(4));
        assert_eq!(outcomes[2].height, 4);
    }

    #[test]
    fn proposed_value_must_fit_the_registry() {
        let outcomes = run(json!({
            "steps": [
                { "op": { "register-zone": {
                    "zone_id": "zone-beta", "description": "", "max_amplitude": 1000,
                    "baseline_energy": 500, "regulation_level": 75 } } },
                { "registry": "zone", "op": { "create-proposal": {
                    "proposal_id": "p1", "entity_id": "zone-beta", "proposed_value": -1,
                    "justification": "", "vote_threshold_hint": 0, "voting_duration": 5 } } },
                { "registry": "zone", "op": { "list-proposals": {} } }
            ]
        }));

        assert!(outcomes[0].is_ok());
        assert_eq!(outcomes[1].error.as_ref().unwrap().code, "REGISTRY_INVALID_ARGUMENT");
        assert_eq!(result(&outcomes[2]), json!([]));
    }

    #[test]
    fn weights_above_u64_are_printed_in_full() {
        let text = r#"{ "steps": [
            { "op": { "register-zone": {
                "zone_id": "zone-beta", "description": "", "max_amplitude": 1000,
                "baseline_energy": 500, "regulation_level": 75 } } },
            { "registry": "zone", "op": { "create-proposal": {
                "proposal_id": "p1", "entity_id": "zone-beta", "proposed_value": 80,
                "justification": "", "vote_threshold_hint": 0, "voting_duration": 5 } } },
            { "caller": "alice", "registry": "zone", "op": { "vote-on-proposal": {
                "proposal_id": "p1", "support": true, "weight": 18446744073709551616 } } },
            { "registry": "zone", "op": { "get-proposal": { "proposal_id": "p1" } } }
        ] }"#;
        let script = Script::from_json(text).unwrap();
        let outcomes = ScriptRunner::new(&RegistryConfig::default()).run(&script);

        assert!(outcomes.iter().all(StepOutcome::is_ok), "{:?}", outcomes);
        let expected = "\"votes_for\":18446744073709551616";
        assert!(outcomes[2].result_text().unwrap().contains(expected));
        assert!(outcomes[3].result_text().unwrap().contains(expected));

        let line = serde_json::to_string(&outcomes[3]).unwrap();
        assert!(line.contains(expected), "{}", line);
    }
}
