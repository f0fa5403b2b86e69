// Path: crates/services/src/governance/mod.rs
//! The proposal lifecycle shared by every registry.
//!
//! `GovernanceEngine<E>` is the proposal registry, the vote tally and the
//! finalizer for one entity type. It keeps no state of its own: every record
//! lives in the `StateAccess` it is handed, under the keys in
//! `qgov_types::keys`, so the host decides what is committed.

use parity_scale_codec::{Decode, Encode};
use qgov_api::context::CallContext;
use qgov_api::state::{get_decoded, put_encoded, StateAccess};
use qgov_telemetry::governance_metrics;
use qgov_types::app::{
    validate_identifier, validate_text, GovernedEntity, Proposal, ProposalStatus, TallyResult,
    VoteReceipt,
};
use qgov_types::codec;
use qgov_types::config::{TextLimits, VotingParams};
use qgov_types::error::RegistryError;
use qgov_types::keys::{
    entity_key, proposal_key, vote_key, KEY_SEPARATOR, PROPOSAL_KEY_PREFIX, VOTE_KEY_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

// --- Service Method Parameter Structs (the shared proposal ABI) ---

/// Parameters of `create-proposal@v1`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CreateProposalParams<V> {
    pub proposal_id: String,
    pub entity_id: String,
    pub proposed_value: V,
    pub justification: String,
    pub vote_threshold_hint: u128,
    pub voting_duration: u64,
}

/// Parameters of `vote-on-proposal@v1`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct VoteParams {
    pub proposal_id: String,
    pub support: bool,
    pub weight: u128,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Parameters of every method that addresses a single proposal.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ProposalIdParams {
    pub proposal_id: String,
}

/// Parameters of `get-vote@v1`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct VoteReceiptParams {
    pub proposal_id: String,
    pub seq: u64,
}

/// The proposal methods every registry exposes in addition to its own.
pub const PROPOSAL_METHODS: &[&str] = &[
    "create-proposal@v1",
    "vote-on-proposal@v1",
    "finalize-proposal@v1",
    "finalize-due@v1",
    "get-proposal@v1",
    "list-proposals@v1",
    "get-vote@v1",
    "list-votes@v1",
];

/// Decodes ABI parameters, reporting malformed bytes as `InvalidArgument`.
pub fn decode_params<T: Decode>(method: &str, params: &[u8]) -> Result<T, RegistryError> {
    codec::from_bytes_canonical(params).map_err(|e| {
        RegistryError::InvalidArgument(format!("malformed parameters for '{}': {}", method, e))
    })
}

// --- Governance Engine ---

/// The proposal registry, vote tally and finalizer for entities of type `E`.
#[derive(Debug, Clone)]
pub struct GovernanceEngine<E> {
    limits: TextLimits,
    voting: VotingParams,
    _entity: PhantomData<fn() -> E>,
}

impl<E: GovernedEntity> GovernanceEngine<E> {
    pub fn new(limits: TextLimits, voting: VotingParams) -> Self {
        Self {
            limits,
            voting,
            _entity: PhantomData,
        }
    }

    pub fn limits(&self) -> &TextLimits {
        &self.limits
    }

    // --- Entity store ---

    pub fn get_entity(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
    ) -> Result<Option<E>, RegistryError> {
        Ok(get_decoded(state, &entity_key(entity_id))?)
    }

    /// Loads an entity, failing with `NotFound` when it was never registered.
    pub fn require_entity(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
    ) -> Result<E, RegistryError> {
        self.get_entity(state, entity_id)?
            .ok_or_else(|| RegistryError::not_found(E::KIND, entity_id))
    }

    pub fn put_entity(
        &self,
        state: &mut dyn StateAccess,
        entity_id: &str,
        entity: &E,
    ) -> Result<(), RegistryError> {
        Ok(put_encoded(state, &entity_key(entity_id), entity)?)
    }

    /// Stores a freshly built entity under a new identifier.
    ///
    /// The caller validates the entity's own text fields; this checks the
    /// identifier and refuses to overwrite an existing record.
    pub fn register_entity(
        &self,
        state: &mut dyn StateAccess,
        entity_id: &str,
        entity: &E,
    ) -> Result<(), RegistryError> {
        validate_identifier(&format!("{} id", E::KIND), entity_id, &self.limits)?;
        if state.get(&entity_key(entity_id))?.is_some() {
            return Err(RegistryError::already_exists(E::KIND, entity_id));
        }
        E::validate_value(entity.governed_value(), &self.limits)?;
        self.put_entity(state, entity_id, entity)?;
        log::info!("[Governance] Registered {} '{}'", E::KIND, entity_id);
        governance_metrics().inc_entities_registered(E::KIND);
        Ok(())
    }

    // --- Proposal registry ---

    fn check_voting_duration(&self, duration: u64) -> Result<(), RegistryError> {
        if duration == 0 {
            return Err(RegistryError::InvalidArgument(
                "voting duration must be positive".into(),
            ));
        }
        let min = self.voting.min_voting_period_blocks.max(1);
        if duration < min {
            return Err(RegistryError::InvalidArgument(format!(
                "voting duration {} is below the minimum of {} blocks",
                duration, min
            )));
        }
        if let Some(max) = self.voting.max_voting_period_blocks {
            if duration > max {
                return Err(RegistryError::InvalidArgument(format!(
                    "voting duration {} exceeds the maximum of {} blocks",
                    duration, max
                )));
            }
        }
        Ok(())
    }

    /// Opens a proposal to change the governed attribute of an existing entity.
    ///
    /// The deadline is `ctx.block_height + voting_duration`. Returns the proposal id.
    pub fn create_proposal(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: CreateProposalParams<E::Value>,
    ) -> Result<String, RegistryError> {
        validate_identifier("proposal id", &params.proposal_id, &self.limits)?;
        validate_identifier(&format!("{} id", E::KIND), &params.entity_id, &self.limits)?;
        validate_text("justification", &params.justification, &self.limits)?;
        E::validate_value(&params.proposed_value, &self.limits)?;
        self.check_voting_duration(params.voting_duration)?;

        if state.get(&entity_key(&params.entity_id))?.is_none() {
            return Err(RegistryError::not_found(E::KIND, params.entity_id));
        }
        let key = proposal_key(&params.proposal_id);
        if state.get(&key)?.is_some() {
            return Err(RegistryError::already_exists("proposal", params.proposal_id));
        }
        let deadline = ctx
            .block_height
            .checked_add(params.voting_duration)
            .ok_or_else(|| {
                RegistryError::Overflow(format!(
                    "deadline of height {} plus {} blocks",
                    ctx.block_height, params.voting_duration
                ))
            })?;

        let proposal = Proposal {
            id: params.proposal_id,
            entity_id: params.entity_id,
            proposed_value: params.proposed_value,
            justification: params.justification,
            vote_threshold_hint: params.vote_threshold_hint,
            proposer: ctx.caller.clone(),
            created_at: ctx.block_height,
            deadline,
            tally: TallyResult::default(),
            status: ProposalStatus::Open,
        };
        put_encoded(state, &key, &proposal)?;

        log::info!(
            "[Governance] Proposal '{}' opened for {} '{}' by {} (deadline {})",
            proposal.id,
            E::KIND,
            proposal.entity_id,
            proposal.proposer,
            deadline
        );
        governance_metrics().inc_proposals_created(E::KIND);
        Ok(proposal.id)
    }

    pub fn get_proposal(
        &self,
        state: &dyn StateAccess,
        proposal_id: &str,
    ) -> Result<Option<Proposal<E::Value>>, RegistryError> {
        Ok(get_decoded(state, &proposal_key(proposal_id))?)
    }

    fn require_proposal(
        &self,
        state: &dyn StateAccess,
        proposal_id: &str,
    ) -> Result<Proposal<E::Value>, RegistryError> {
        self.get_proposal(state, proposal_id)?
            .ok_or_else(|| RegistryError::not_found("proposal", proposal_id))
    }

    /// Every proposal in key order.
    pub fn list_proposals(
        &self,
        state: &dyn StateAccess,
    ) -> Result<Vec<Proposal<E::Value>>, RegistryError> {
        let mut proposals = Vec::new();
        for item in state.prefix_scan(PROPOSAL_KEY_PREFIX)? {
            let (_key, bytes) = item?;
            proposals.push(codec::from_bytes_canonical(&bytes)?);
        }
        Ok(proposals)
    }

    /// Open proposals whose voting window has closed at `height`.
    pub fn due_proposals(
        &self,
        state: &dyn StateAccess,
        height: u64,
    ) -> Result<Vec<Proposal<E::Value>>, RegistryError> {
        Ok(self
            .list_proposals(state)?
            .into_iter()
            .filter(|p| p.status == ProposalStatus::Open && height >= p.deadline)
            .collect())
    }

    // --- Vote tally ---

    /// Adds a weighted vote to an open proposal and returns the new totals.
    ///
    /// Votes are accepted while `height < deadline`. The same caller may vote
    /// any number of times; each accepted vote is kept as a `VoteReceipt`.
    pub fn cast_vote(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        params: VoteParams,
    ) -> Result<TallyResult, RegistryError> {
        if let Some(comment) = &params.comment {
            validate_text("comment", comment, &self.limits)?;
        }
        let mut proposal = self.require_proposal(state, &params.proposal_id)?;
        if proposal.status != ProposalStatus::Open {
            return Err(RegistryError::InvalidState {
                id: proposal.id,
                status: proposal.status,
            });
        }
        if ctx.block_height >= proposal.deadline {
            return Err(RegistryError::DeadlinePassed {
                id: proposal.id,
                deadline: proposal.deadline,
                height: ctx.block_height,
            });
        }

        let tally = proposal.tally.with_vote(params.support, params.weight)?;
        let seq = proposal.tally.vote_count;
        proposal.tally = tally.clone();
        let receipt = VoteReceipt {
            voter: ctx.caller.clone(),
            support: params.support,
            weight: params.weight,
            comment: params.comment,
            cast_at: ctx.block_height,
        };
        put_encoded(state, &proposal_key(&proposal.id), &proposal)?;
        put_encoded(state, &vote_key(&proposal.id, seq), &receipt)?;

        log::debug!(
            "[Tally] Proposal '{}': {} voted {} with weight {} (for {}, against {})",
            proposal.id,
            receipt.voter,
            if receipt.support { "for" } else { "against" },
            receipt.weight,
            tally.votes_for,
            tally.votes_against
        );
        governance_metrics().inc_votes_cast(E::KIND, receipt.support);
        Ok(tally)
    }

    /// The `seq`-th accepted vote on a proposal, counting from zero.
    pub fn get_vote(
        &self,
        state: &dyn StateAccess,
        proposal_id: &str,
        seq: u64,
    ) -> Result<Option<VoteReceipt>, RegistryError> {
        Ok(get_decoded(state, &vote_key(proposal_id, seq))?)
    }

    /// Every accepted vote on a proposal, in casting order.
    pub fn list_votes(
        &self,
        state: &dyn StateAccess,
        proposal_id: &str,
    ) -> Result<Vec<VoteReceipt>, RegistryError> {
        let prefix = [VOTE_KEY_PREFIX, proposal_id.as_bytes(), KEY_SEPARATOR].concat();
        let mut receipts = Vec::new();
        for item in state.prefix_scan(&prefix)? {
            let (_key, bytes) = item?;
            receipts.push(codec::from_bytes_canonical(&bytes)?);
        }
        Ok(receipts)
    }

    // --- Finalizer ---

    /// Decides an open, due proposal and writes the outcome.
    fn settle(
        &self,
        state: &mut dyn StateAccess,
        mut proposal: Proposal<E::Value>,
    ) -> Result<bool, RegistryError> {
        let approved = proposal.tally.approves();
        if approved {
            let mut entity = self.require_entity(state, &proposal.entity_id)?;
            entity.apply_governed_value(proposal.proposed_value.clone())?;
            self.put_entity(state, &proposal.entity_id, &entity)?;
            log::info!(
                "[Governance] {} '{}' now {:?} after {} adjustment(s)",
                E::KIND,
                proposal.entity_id,
                entity.governed_value(),
                entity.adjustment_count()
            );
            proposal.status = ProposalStatus::Approved;
        } else {
            proposal.status = ProposalStatus::Rejected;
        }
        put_encoded(state, &proposal_key(&proposal.id), &proposal)?;

        log::info!(
            "[Governance] Proposal '{}' {}: for {}, against {} over {} votes",
            proposal.id,
            proposal.status,
            proposal.tally.votes_for,
            proposal.tally.votes_against,
            proposal.tally.vote_count
        );
        Ok(approved)
    }

    /// Finalizes a proposal whose deadline has been reached.
    ///
    /// Approval requires strictly more weight for than against; on approval
    /// the entity takes the proposed value and its adjustment count goes up
    /// by one. On rejection the entity is not touched. Returns `true` when
    /// approved.
    pub fn finalize(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        proposal_id: &str,
    ) -> Result<bool, RegistryError> {
        let proposal = self.require_proposal(state, proposal_id)?;
        if proposal.status != ProposalStatus::Open {
            return Err(RegistryError::InvalidState {
                id: proposal.id,
                status: proposal.status,
            });
        }
        if ctx.block_height < proposal.deadline {
            return Err(RegistryError::TooEarly {
                id: proposal.id,
                deadline: proposal.deadline,
                height: ctx.block_height,
            });
        }
        let approved = self.settle(state, proposal)?;
        governance_metrics().inc_proposals_finalized(E::KIND, outcome_label(approved));
        Ok(approved)
    }

    /// Finalizes every open proposal whose deadline has been reached, in key
    /// order. Returns `(proposal id, approved)` for each.
    pub fn finalize_due(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
    ) -> Result<Vec<(String, bool)>, RegistryError> {
        let due = self.due_proposals(state, ctx.block_height)?;
        let mut outcomes = Vec::with_capacity(due.len());
        for proposal in due {
            let id = proposal.id.clone();
            let approved = self.settle(state, proposal)?;
            outcomes.push((id, approved));
        }
        if !outcomes.is_empty() {
            log::info!(
                "[Governance] Finalized {} due {} proposal(s) at height {}",
                outcomes.len(),
                E::KIND,
                ctx.block_height
            );
        }
        for (_, approved) in &outcomes {
            governance_metrics().inc_proposals_finalized(E::KIND, outcome_label(*approved));
        }
        Ok(outcomes)
    }

    // --- ABI ---

    /// Dispatches the shared proposal methods. Returns `Ok(None)` for a method
    /// this engine does not own, so the registry can report it.
    pub fn dispatch(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &CallContext,
    ) -> Result<Option<Vec<u8>>, RegistryError> {
        let response = match method {
            "create-proposal@v1" => {
                let p: CreateProposalParams<E::Value> = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.create_proposal(state, ctx, p)?)
            }
            "vote-on-proposal@v1" => {
                let p: VoteParams = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.cast_vote(state, ctx, p)?)
            }
            "finalize-proposal@v1" => {
                let p: ProposalIdParams = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.finalize(state, ctx, &p.proposal_id)?)
            }
            "finalize-due@v1" => {
                decode_params::<()>(method, params)?;
                codec::to_bytes_canonical(&self.finalize_due(state, ctx)?)
            }
            "get-proposal@v1" => {
                let p: ProposalIdParams = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.get_proposal(state, &p.proposal_id)?)
            }
            "list-proposals@v1" => {
                decode_params::<()>(method, params)?;
                codec::to_bytes_canonical(&self.list_proposals(state)?)
            }
            "get-vote@v1" => {
                let p: VoteReceiptParams = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.get_vote(state, &p.proposal_id, p.seq)?)
            }
            "list-votes@v1" => {
                let p: ProposalIdParams = decode_params(method, params)?;
                codec::to_bytes_canonical(&self.list_votes(state, &p.proposal_id)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(response))
    }
}

fn outcome_label(approved: bool) -> &'static str {
    if approved {
        "approved"
    } else {
        "rejected"
    }
}
