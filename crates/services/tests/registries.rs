// Path: crates/services/tests/registries.rs
//! End-to-end runs of the three registries behind one `RegistryHost`.

use qgov_api::clock::ManualClock;
use qgov_api::error::ErrorKind;
use qgov_api::services::RegistryService;
use qgov_api::state::{registry_namespace_prefix, StateAccess};
use qgov_services::duality::{
    EntityEventIdParams, RecordObservationParams, RecordTransitionParams, RegisterEntityParams,
    DUALITY_SERVICE_ID,
};
use qgov_services::field_consensus::{
    FieldIdParams, RegisterFieldParams, FIELD_CONSENSUS_SERVICE_ID,
};
use qgov_services::fluctuation_regulation::{
    CreatePolicyParams, RecordFluctuationParams, RegisterZoneParams,
    FLUCTUATION_REGULATION_SERVICE_ID,
};
use qgov_services::governance::{
    CreateProposalParams, ProposalIdParams, VoteParams, PROPOSAL_METHODS,
};
use qgov_services::{
    DualityService, FieldConsensusService, FluctuationRegulationService, RegistryHost,
};
use qgov_state::memory::MemoryStore;
use qgov_test_utils::fixtures::{account, beta_zone, deployer, store_and_clock};
use qgov_test_utils::{assert_err_kind, assert_ok};
use qgov_types::app::{ProposalStatus, QuantumField, StateLabel, TallyResult, ZoneStatus};
use qgov_types::codec;
use qgov_types::config::RegistryConfig;
use std::sync::Arc;

fn host_at(height: u64) -> (RegistryHost<MemoryStore>, Arc<ManualClock>) {
    let (store, clock) = store_and_clock(height);
    (RegistryHost::new(store, clock.clone()), clock)
}

fn config() -> RegistryConfig {
    RegistryConfig::default()
}

fn vote(proposal_id: &str, support: bool, weight: u128) -> VoteParams {
    VoteParams {
        proposal_id: proposal_id.into(),
        support,
        weight,
        comment: None,
    }
}

#[test]
fn field_adjustment_is_approved_after_the_deadline() {
    let (host, clock) = host_at(1);
    let svc = FieldConsensusService::from_config(&config());
    let id = FIELD_CONSENSUS_SERVICE_ID;

    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.register_field(
        state,
        ctx,
        RegisterFieldParams {
            field_id: "higgs-field-001".into(),
            description: "Standard Higgs field with normal parameters".into(),
            initial_value: 246,
            baseline_value: 246,
            stability_index: 95,
        },
    )));

    clock.advance(1);
    let proposal_id = assert_ok!(host.transact(id, &deployer(), |state, ctx| svc
        .create_proposal(
            state,
            ctx,
            CreateProposalParams {
                proposal_id: "proposal-001".into(),
                entity_id: "higgs-field-001".into(),
                proposed_value: 250,
                justification: "Adjusting for quantum fluctuations".into(),
                vote_threshold_hint: 100,
                voting_duration: 10,
            },
        )));
    assert_eq!(proposal_id, "proposal-001");

    clock.advance(1);
    assert_ok!(host.transact(id, &account("alice"), |state, ctx| svc
        .vote_on_proposal(state, ctx, vote("proposal-001", true, 60))));
    let tally = assert_ok!(host.transact(id, &account("bob"), |state, ctx| svc
        .vote_on_proposal(state, ctx, vote("proposal-001", false, 40))));
    assert_eq!(
        tally,
        TallyResult {
            votes_for: 60,
            votes_against: 40,
            vote_count: 2,
        }
    );

    clock.set(11);
    let finalize = ProposalIdParams {
        proposal_id: "proposal-001".into(),
    };
    assert_err_kind!(
        host.transact(id, &deployer(), |state, ctx| svc.finalize_proposal(
            state,
            ctx,
            finalize.clone()
        )),
        ErrorKind::TooEarly
    );

    clock.set(12);
    assert_err_kind!(
        host.transact(id, &account("carol"), |state, ctx| svc.vote_on_proposal(
            state,
            ctx,
            vote("proposal-001", false, 1_000)
        )),
        ErrorKind::DeadlinePassed
    );
    assert!(assert_ok!(host.transact(id, &deployer(), |state, ctx| svc
        .finalize_proposal(state, ctx, finalize.clone()))));

    let field = assert_ok!(host.query(id, |state| svc.get_field(state, "higgs-field-001")))
        .unwrap();
    assert_eq!(field.current_value, 250);
    assert_eq!(field.adjustment_count, 1);

    let proposal = assert_ok!(host.query(id, |state| svc.get_proposal(state, "proposal-001")))
        .unwrap();
    assert_eq!(proposal.status, ProposalStatus::Approved);

    assert_err_kind!(
        host.transact(id, &deployer(), |state, ctx| svc.finalize_proposal(
            state,
            ctx,
            finalize.clone()
        )),
        ErrorKind::InvalidState
    );
}

#[test]
fn fluctuations_and_policies_leave_the_regulation_level_alone() {
    let (host, clock) = host_at(1);
    let svc = FluctuationRegulationService::from_config(&config());
    let id = FLUCTUATION_REGULATION_SERVICE_ID;

    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.register_zone(
        state,
        ctx,
        RegisterZoneParams {
            zone_id: "zone-beta".into(),
            description: "Quantum vacuum fluctuation zone in sector beta".into(),
            max_amplitude: 1000,
            baseline_energy: 500,
            regulation_level: 75,
        },
    )));
    let registered = assert_ok!(host.query(id, |state| svc.get_zone(state, "zone-beta"))).unwrap();
    assert_eq!(registered, beta_zone(1));

    clock.advance(1);
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.record_fluctuation(
        state,
        ctx,
        RecordFluctuationParams {
            zone_id: "zone-beta".into(),
            event_id: "fluctuation-001".into(),
            amplitude: 800,
            energy_delta: 50,
            regulated: true,
            outcome: "Fluctuation successfully regulated".into(),
        },
    )));
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.create_policy(
        state,
        ctx,
        CreatePolicyParams {
            policy_id: "policy-001".into(),
            description: "Dampen fluctuations above threshold".into(),
            threshold_amplitude: 750,
            intervention_method: "energy-dampening".into(),
            cooldown_period: 10,
        },
    )));

    let zone = assert_ok!(host.query(id, |state| svc.get_zone(state, "zone-beta"))).unwrap();
    assert_eq!(zone.regulation_level, 75);
    assert_eq!(zone.adjustment_count, 0);
    assert_eq!(zone.status, ZoneStatus::Active);

    let event = assert_ok!(host.query(id, |state| svc.get_fluctuation_event(
        state,
        "zone-beta",
        "fluctuation-001"
    )))
    .unwrap();
    assert_eq!(event.recorded_at, 2);
    assert!(event.regulated);

    let policy = assert_ok!(host.query(id, |state| svc.get_policy(state, "policy-001"))).unwrap();
    assert!(policy.active);
    assert_eq!(policy.threshold_amplitude, 750);
}

#[test]
fn observation_and_transition_move_entities() {
    let (host, clock) = host_at(1);
    let svc = DualityService::from_config(&config());
    let id = DUALITY_SERVICE_ID;

    for (entity_id, initial, wave, stability) in [
        ("photon-001", "superposition", 50, 75),
        ("photon-002", "superposition", 50, 75),
        ("photon-003", "wave", 80, 60),
    ] {
        assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.register_entity(
            state,
            ctx,
            RegisterEntityParams {
                entity_id: entity_id.into(),
                description: "Photon with dual nature".into(),
                initial_state: StateLabel::new(initial),
                wave_probability: wave,
                stability_factor: stability,
            },
        )));
    }

    clock.advance(1);
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.record_observation(
        state,
        ctx,
        RecordObservationParams {
            entity_id: "photon-002".into(),
            observation_id: "observation-001".into(),
            observer_id: "observer-alpha".into(),
            observed_state: StateLabel::new("particle"),
            measurement_type: "double-slit".into(),
            certainty_level: 90,
        },
    )));
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.record_transition(
        state,
        ctx,
        RecordTransitionParams {
            entity_id: "photon-003".into(),
            transition_id: "transition-001".into(),
            from_state: StateLabel::new("wave"),
            to_state: StateLabel::new("superposition"),
            trigger: "quantum-tunneling".into(),
            energy_change: 25,
        },
    )));

    let photon1 = assert_ok!(host.query(id, |state| svc.get_entity(state, "photon-001"))).unwrap();
    let photon2 = assert_ok!(host.query(id, |state| svc.get_entity(state, "photon-002"))).unwrap();
    let photon3 = assert_ok!(host.query(id, |state| svc.get_entity(state, "photon-003"))).unwrap();
    assert_eq!(photon1.current_state.as_str(), "superposition");
    assert_eq!(photon2.current_state.as_str(), "particle");
    assert_eq!(photon3.current_state.as_str(), "superposition");
    assert_eq!(photon2.adjustment_count, 0);
    assert_eq!(photon3.adjustment_count, 0);

    let observation = assert_ok!(host.query(id, |state| svc.get_observation(
        state,
        "photon-002",
        "observation-001"
    )))
    .unwrap();
    assert_eq!(observation.observer_id, "observer-alpha");
    assert_eq!(observation.recorded_at, 2);
}

#[test]
fn failed_operations_leave_the_store_untouched() {
    let (host, _clock) = host_at(1);
    let svc = FieldConsensusService::from_config(&config());
    let id = FIELD_CONSENSUS_SERVICE_ID;

    let register = |field_id: &str| RegisterFieldParams {
        field_id: field_id.into(),
        description: "Standard Higgs field".into(),
        initial_value: 246,
        baseline_value: 246,
        stability_index: 95,
    };
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.register_field(
        state,
        ctx,
        register("higgs-field-001")
    )));
    let before = host.inspect(|store| store.clone());

    assert_err_kind!(
        host.transact(id, &deployer(), |state, ctx| svc.register_field(
            state,
            ctx,
            register("higgs-field-001")
        )),
        ErrorKind::AlreadyExists
    );

    // A closure that writes and then fails must not leak its write.
    assert_err_kind!(
        host.transact(id, &deployer(), |state, ctx| {
            svc.register_field(state, ctx, register("higgs-field-002"))?;
            svc.register_field(state, ctx, register("higgs-field-001"))
        }),
        ErrorKind::AlreadyExists
    );
    assert_eq!(host.inspect(|store| store.clone()), before);
}

#[test]
fn registries_cannot_see_each_other() {
    let (host, _clock) = host_at(1);
    let fields = FieldConsensusService::from_config(&config());
    let duality = DualityService::from_config(&config());

    assert_ok!(host.transact(FIELD_CONSENSUS_SERVICE_ID, &deployer(), |state, ctx| fields
        .register_field(
            state,
            ctx,
            RegisterFieldParams {
                field_id: "shared-001".into(),
                description: String::new(),
                initial_value: 1,
                baseline_value: 1,
                stability_index: 1,
            },
        )));
    // The same identifier is free in another registry.
    assert_ok!(host.transact(DUALITY_SERVICE_ID, &deployer(), |state, ctx| duality
        .register_entity(
            state,
            ctx,
            RegisterEntityParams {
                entity_id: "shared-001".into(),
                description: String::new(),
                initial_state: StateLabel::new("wave"),
                wave_probability: 10,
                stability_factor: 10,
            },
        )));

    // Each registry reads back its own record under the shared id.
    let field = assert_ok!(host.query(FIELD_CONSENSUS_SERVICE_ID, |state| fields
        .get_field(state, "shared-001")))
    .unwrap();
    assert_eq!(field.current_value, 1);
    let entity = assert_ok!(host.query(DUALITY_SERVICE_ID, |state| duality
        .get_entity(state, "shared-001")))
    .unwrap();
    assert_eq!(entity.current_state, StateLabel::new("wave"));

    // An id registered in only one registry stays unknown to the other.
    assert_ok!(host.transact(FIELD_CONSENSUS_SERVICE_ID, &deployer(), |state, ctx| fields
        .register_field(
            state,
            ctx,
            RegisterFieldParams {
                field_id: "field-only".into(),
                description: String::new(),
                initial_value: 2,
                baseline_value: 2,
                stability_index: 2,
            },
        )));
    assert_eq!(
        assert_ok!(host.query(DUALITY_SERVICE_ID, |state| duality.get_entity(state, "field-only"))),
        None
    );
    assert!(assert_ok!(host.query(FIELD_CONSENSUS_SERVICE_ID, |state| fields
        .get_field(state, "field-only")))
    .is_some());

    let field_prefix = registry_namespace_prefix(FIELD_CONSENSUS_SERVICE_ID);
    let duality_prefix = registry_namespace_prefix(DUALITY_SERVICE_ID);
    host.inspect(|store| {
        let keys: Vec<Vec<u8>> = store.iter().map(|(k, _)| k.to_vec()).collect();
        assert!(!keys.is_empty());
        assert!(keys
            .iter()
            .all(|k| k.starts_with(&field_prefix) || k.starts_with(&duality_prefix)));
        assert!(keys.iter().any(|k| k.starts_with(&field_prefix)));
        assert!(keys.iter().any(|k| k.starts_with(&duality_prefix)));
    });
}

#[test]
fn queries_see_only_relative_keys() {
    let (host, _clock) = host_at(1);
    let svc = FluctuationRegulationService::from_config(&config());
    let id = FLUCTUATION_REGULATION_SERVICE_ID;
    assert_ok!(host.transact(id, &deployer(), |state, ctx| svc.register_zone(
        state,
        ctx,
        RegisterZoneParams {
            zone_id: "zone-gamma".into(),
            description: String::new(),
            max_amplitude: 10,
            baseline_energy: 10,
            regulation_level: 10,
        },
    )));

    let keys = assert_ok!(host.query(id, |state| {
        let mut keys = Vec::new();
        for item in state.prefix_scan(b"")? {
            let (key, _) = item?;
            keys.push(key.to_vec());
        }
        Ok(keys)
    }));
    assert_eq!(keys.len(), 1);
    assert!(keys.iter().all(|k| !k.starts_with(b"_registry::")));
    assert!(keys.iter().all(|k| k.ends_with(b"zone-gamma")));

    // Another registry's view of the same store is empty.
    let other = assert_ok!(host.query(DUALITY_SERVICE_ID, |state| Ok(state
        .prefix_scan(b"")?
        .count())));
    assert_eq!(other, 0);
}

#[test]
fn abi_calls_go_through_the_host() {
    let (host, clock) = host_at(5);
    let svc = DualityService::from_config(&config());

    let register = RegisterEntityParams {
        entity_id: "photon-001".into(),
        description: "Standard photon with dual nature".into(),
        initial_state: StateLabel::new("superposition"),
        wave_probability: 50,
        stability_factor: 75,
    };
    assert_ok!(host.call(
        &svc,
        &deployer(),
        "register-entity@v1",
        &codec::to_bytes_canonical(&register)
    ));

    clock.advance(1);
    let observe = RecordObservationParams {
        entity_id: "photon-001".into(),
        observation_id: "observation-001".into(),
        observer_id: "observer-beta".into(),
        observed_state: StateLabel::new("wave"),
        measurement_type: "interferometer".into(),
        certainty_level: 70,
    };
    assert_ok!(host.call(
        &svc,
        &deployer(),
        "record-observation@v1",
        &codec::to_bytes_canonical(&observe)
    ));

    let bytes = assert_ok!(host.call(
        &svc,
        &deployer(),
        "get-observation@v1",
        &codec::to_bytes_canonical(&EntityEventIdParams {
            entity_id: "photon-001".into(),
            event_id: "observation-001".into(),
        })
    ));
    let observation: Option<qgov_types::app::Observation> =
        codec::from_bytes_canonical(&bytes).unwrap();
    assert_eq!(observation.unwrap().recorded_at, 6);

    let err = assert_err_kind!(
        host.call(&svc, &deployer(), "get-field@v1", &[]),
        ErrorKind::InvalidArgument
    );
    assert!(err.to_string().contains(svc.id()));
}

#[test]
fn field_reads_through_the_abi_decode_to_fields() {
    let (host, _clock) = host_at(1);
    let svc = FieldConsensusService::from_config(&config());
    let query = codec::to_bytes_canonical(&FieldIdParams {
        field_id: "missing".into(),
    });
    let bytes = assert_ok!(host.call(&svc, &deployer(), "get-field@v1", &query));
    let field: Option<QuantumField> = codec::from_bytes_canonical(&bytes).unwrap();
    assert_eq!(field, None);
}

#[test]
fn every_registry_speaks_the_proposal_methods() {
    let cfg = config();
    let fields = FieldConsensusService::from_config(&cfg);
    let zones = FluctuationRegulationService::from_config(&cfg);
    let entities = DualityService::from_config(&cfg);
    let services: [&dyn RegistryService; 3] = [&fields, &zones, &entities];
    for svc in services {
        for method in PROPOSAL_METHODS {
            assert!(svc.methods().contains(method), "{} lacks {}", svc.id(), method);
        }
    }
}

#[test]
fn the_store_outlives_the_host() {
    let (host, _clock) = host_at(3);
    let svc = FieldConsensusService::from_config(&config());
    assert_ok!(host.transact(FIELD_CONSENSUS_SERVICE_ID, &deployer(), |state, ctx| svc
        .register_field(
            state,
            ctx,
            RegisterFieldParams {
                field_id: "higgs-field-001".into(),
                description: String::new(),
                initial_value: 246,
                baseline_value: 246,
                stability_index: 95,
            },
        )));

    let store = host.into_store();
    let mut key = registry_namespace_prefix(FIELD_CONSENSUS_SERVICE_ID);
    key.extend_from_slice(b"entity::higgs-field-001");
    let bytes = store.get(&key).unwrap().unwrap();
    let field: QuantumField = codec::from_bytes_canonical(&bytes).unwrap();
    assert_eq!(field.current_value, 246);
    assert_eq!(field.registered_at, 3);
}
