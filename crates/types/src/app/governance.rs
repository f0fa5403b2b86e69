// Path: crates/types/src/app/governance.rs
//! The proposal lifecycle shared by all registries.

use crate::app::AccountId;
use crate::config::TextLimits;
use crate::error::RegistryError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a proposal.
///
/// `Open` is the only non-terminal status. There is no transition back to it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// The proposal accepts votes until its deadline.
    Open,
    /// Finalized with more weight for than against; its value was applied.
    Approved,
    /// Finalized without a strict majority for; nothing was applied.
    Rejected,
}

impl ProposalStatus {
    /// Returns `true` for `Approved` and `Rejected`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Open)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Open => f.write_str("open"),
            ProposalStatus::Approved => f.write_str("approved"),
            ProposalStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// The running vote totals of a proposal.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TallyResult {
    /// The total weight of supporting votes.
    pub votes_for: u128,
    /// The total weight of opposing votes.
    pub votes_against: u128,
    /// The number of votes accepted so far.
    pub vote_count: u64,
}

impl TallyResult {
    /// Returns the tally with one more vote counted, or `Overflow` if any
    /// counter would leave its range. `self` is never modified.
    pub fn with_vote(&self, support: bool, weight: u128) -> Result<TallyResult, RegistryError> {
        let mut next = self.clone();
        let side = if support {
            &mut next.votes_for
        } else {
            &mut next.votes_against
        };
        *side = side.checked_add(weight).ok_or_else(|| {
            RegistryError::Overflow(format!(
                "adding weight {} to the {} total",
                weight,
                if support { "for" } else { "against" }
            ))
        })?;
        next.vote_count = next
            .vote_count
            .checked_add(1)
            .ok_or_else(|| RegistryError::Overflow("vote count".into()))?;
        Ok(next)
    }

    /// A proposal passes only with strictly more weight for than against.
    pub fn approves(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

/// A time-bounded request to change the governed attribute of an entity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Proposal<V> {
    /// The unique identifier of the proposal.
    pub id: String,
    /// The entity whose attribute the proposal changes.
    pub entity_id: String,
    /// The value written to the entity on approval.
    pub proposed_value: V,
    /// Free-text reasoning supplied by the proposer.
    pub justification: String,
    /// A threshold suggested by the proposer. Recorded, never enforced.
    pub vote_threshold_hint: u128,
    /// The principal that created the proposal.
    pub proposer: AccountId,
    /// The height at which the proposal was created.
    pub created_at: u64,
    /// Votes are accepted while `height < deadline`; finalization requires `height >= deadline`.
    pub deadline: u64,
    /// Running totals.
    pub tally: TallyResult,
    /// The lifecycle status.
    pub status: ProposalStatus,
}

/// The audit record of one accepted vote.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct VoteReceipt {
    /// The principal that cast the vote.
    pub voter: AccountId,
    /// `true` for a vote in favour.
    pub support: bool,
    /// The caller-asserted weight.
    pub weight: u128,
    /// An optional comment.
    pub comment: Option<String>,
    /// The height at which the vote was accepted.
    pub cast_at: u64,
}

/// An entity whose attribute can be changed by proposal.
///
/// Each registry implements this for its entity type; the governance engine
/// is generic over it.
pub trait GovernedEntity:
    Encode + Decode + Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static
{
    /// The type of the governed attribute.
    type Value: Encode
        + Decode
        + Clone
        + PartialEq
        + fmt::Debug
        + Serialize
        + Send
        + Sync
        + 'static;

    /// The record kind used in errors and logs (e.g. "field").
    const KIND: &'static str;

    /// Validates a proposed value before a proposal is stored.
    fn validate_value(value: &Self::Value, limits: &TextLimits) -> Result<(), RegistryError> {
        let _ = (value, limits);
        Ok(())
    }

    /// The current value of the governed attribute.
    fn governed_value(&self) -> &Self::Value;

    /// The number of approved proposals applied to this entity.
    fn adjustment_count(&self) -> u128;

    /// Writes an approved value and increments the adjustment counter.
    ///
    /// Implementations must leave `self` untouched when they return an error.
    fn apply_governed_value(&mut self, value: Self::Value) -> Result<(), RegistryError>;
}

/// Returns `count + 1`, failing closed at the top of the range.
pub(crate) fn next_count(count: u128, what: &str) -> Result<u128, RegistryError> {
    count
        .checked_add(1)
        .ok_or_else(|| RegistryError::Overflow(what.to_string()))
}
