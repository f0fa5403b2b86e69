// Path: crates/services/tests/metrics.rs
//! Counters reported through an installed sink. Kept in its own test binary
//! because the sink can be installed only once per process.

use parking_lot::Mutex;
use qgov_api::error::ErrorKind;
use qgov_services::field_consensus::{RegisterFieldParams, FIELD_CONSENSUS_SERVICE_ID};
use qgov_services::governance::{CreateProposalParams, ProposalIdParams, VoteParams};
use qgov_services::{FieldConsensusService, RegistryHost};
use qgov_telemetry::sinks::{ErrorMetricsSink, GovernanceMetricsSink, ServiceMetricsSink, SINK};
use qgov_test_utils::fixtures::{account, deployer, store_and_clock};
use qgov_test_utils::{assert_err_kind, assert_ok};
use qgov_types::config::RegistryConfig;
use qgov_types::error::RegistryError;

#[derive(Debug)]
struct Recorder(Mutex<Vec<String>>);

static RECORDER: Recorder = Recorder(Mutex::new(Vec::new()));

impl Recorder {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }

    fn push(&self, line: String) {
        self.0.lock().push(line);
    }
}

impl GovernanceMetricsSink for Recorder {
    fn inc_entities_registered(&self, kind: &str) {
        self.push(format!("registered {}", kind));
    }
    fn inc_proposals_created(&self, kind: &str) {
        self.push(format!("proposal {}", kind));
    }
    fn inc_votes_cast(&self, kind: &str, support: bool) {
        self.push(format!("vote {} {}", kind, support));
    }
    fn inc_proposals_finalized(&self, kind: &str, outcome: &'static str) {
        self.push(format!("finalized {} {}", kind, outcome));
    }
    fn inc_domain_events(&self, event_kind: &str) {
        self.push(format!("event {}", event_kind));
    }
}

impl ErrorMetricsSink for Recorder {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        self.push(format!("error {} {}", kind, variant));
    }
}

impl ServiceMetricsSink for Recorder {
    fn observe_service_dispatch_latency(&self, _: &str, _: &str, _: f64) {}
    fn inc_dispatch_error(&self, _: &str, _: &str, _: &'static str) {}
}

fn field(id: &str) -> RegisterFieldParams {
    RegisterFieldParams {
        field_id: id.into(),
        description: String::new(),
        initial_value: 246,
        baseline_value: 246,
        stability_index: 95,
    }
}

fn proposal(id: &str) -> ProposalIdParams {
    ProposalIdParams {
        proposal_id: id.into(),
    }
}

#[test]
fn only_committed_calls_are_counted() {
    assert!(SINK.set(&RECORDER).is_ok());
    let (store, clock) = store_and_clock(1);
    let host = RegistryHost::new(store, clock.clone());
    let svc = FieldConsensusService::from_config(&RegistryConfig::default());
    let id = FIELD_CONSENSUS_SERVICE_ID;

    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc
        .register_field(state, ctx, field("higgs-field-001"))));
    assert_eq!(RECORDER.take(), vec!["registered field"]);

    // The registration succeeds inside the call, but the call as a whole fails.
    assert_err_kind!(
        host.transact(id, &deployer(), |state, ctx| {
            svc.register_field(state, ctx, field("higgs-field-002"))?;
            Err::<(), _>(RegistryError::InvalidArgument("abandoned".into()))
        }),
        ErrorKind::InvalidArgument
    );
    assert_eq!(RECORDER.take(), vec!["error registry REGISTRY_INVALID_ARGUMENT"]);
    assert_eq!(
        assert_ok!(host.query(id, |state| svc.get_field(state, "higgs-field-002"))),
        None
    );

    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.create_proposal(
        state,
        ctx,
        CreateProposalParams {
            proposal_id: "proposal-001".into(),
            entity_id: "higgs-field-001".into(),
            proposed_value: 250,
            justification: String::new(),
            vote_threshold_hint: 0,
            voting_duration: 5,
        },
    )));
    assert_ok!(host.transact(id, &account("alice"), |state, ctx| svc.vote_on_proposal(
        state,
        ctx,
        VoteParams {
            proposal_id: "proposal-001".into(),
            support: true,
            weight: 60,
            comment: None,
        },
    )));
    assert_eq!(RECORDER.take(), vec!["proposal field", "vote field true"]);

    // A vote followed by a failing step in the same call leaves no trace.
    assert_err_kind!(
        host.transact(id, &account("bob"), |state, ctx| {
            svc.vote_on_proposal(
                state,
                ctx,
                VoteParams {
                    proposal_id: "proposal-001".into(),
                    support: false,
                    weight: 40,
                    comment: None,
                },
            )?;
            svc.finalize_proposal(state, ctx, proposal("proposal-001"))
        }),
        ErrorKind::TooEarly
    );
    assert_eq!(RECORDER.take(), vec!["error registry REGISTRY_TOO_EARLY"]);

    clock.advance(5);
    assert!(assert_ok!(host.transact(id, &deployer(), |state, ctx| svc
        .finalize_proposal(state, ctx, proposal("proposal-001")))));
    assert_eq!(RECORDER.take(), vec!["finalized field approved"]);
}
