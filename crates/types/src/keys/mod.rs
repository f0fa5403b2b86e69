// Path: crates/types/src/keys/mod.rs
//! Defines constants for well-known state key prefixes.
//!
//! These keys are relative to a registry's namespace; the host prefixes them
//! with `_registry::{service_id}::` before they reach the store, so every
//! registry can use the same layout without colliding.

/// The state key prefix for governed entities, keyed by entity id.
pub const ENTITY_KEY_PREFIX: &[u8] = b"entity::";
/// The state key prefix for proposals, keyed by proposal id.
pub const PROPOSAL_KEY_PREFIX: &[u8] = b"proposal::";
/// The state key prefix for vote receipts: `vote::{proposal_id}::{seq}`.
pub const VOTE_KEY_PREFIX: &[u8] = b"vote::";
/// The state key prefix for domain events: `event::{kind}::{entity_id}::{event_id}`.
pub const EVENT_KEY_PREFIX: &[u8] = b"event::";
/// The state key prefix for regulation policies, keyed by policy id.
pub const POLICY_KEY_PREFIX: &[u8] = b"policy::";

/// The separator placed between key components.
pub const KEY_SEPARATOR: &[u8] = b"::";

/// The key of an entity record.
pub fn entity_key(entity_id: &str) -> Vec<u8> {
    [ENTITY_KEY_PREFIX, entity_id.as_bytes()].concat()
}

/// The key of a proposal record.
pub fn proposal_key(proposal_id: &str) -> Vec<u8> {
    [PROPOSAL_KEY_PREFIX, proposal_id.as_bytes()].concat()
}

/// The key of a vote receipt. The sequence number is big-endian so receipts
/// scan in casting order.
pub fn vote_key(proposal_id: &str, seq: u64) -> Vec<u8> {
    [
        VOTE_KEY_PREFIX,
        proposal_id.as_bytes(),
        KEY_SEPARATOR,
        &seq.to_be_bytes(),
    ]
    .concat()
}

/// The key of a domain event record.
pub fn event_key(kind: &str, entity_id: &str, event_id: &str) -> Vec<u8> {
    [
        EVENT_KEY_PREFIX,
        kind.as_bytes(),
        KEY_SEPARATOR,
        entity_id.as_bytes(),
        KEY_SEPARATOR,
        event_id.as_bytes(),
    ]
    .concat()
}

/// The key of a regulation policy.
pub fn policy_key(policy_id: &str) -> Vec<u8> {
    [POLICY_KEY_PREFIX, policy_id.as_bytes()].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_keys_sort_in_casting_order() {
        let a = vote_key("p", 1);
        let b = vote_key("p", 256);
        assert!(a < b);
        assert!(a.starts_with(VOTE_KEY_PREFIX));
    }

    #[test]
    fn event_keys_separate_kinds() {
        assert_ne!(
            event_key("observation", "photon-002", "e1"),
            event_key("transition", "photon-002", "e1")
        );
        assert_eq!(
            event_key("fluctuation", "zone", "f1"),
            b"event::fluctuation::zone::f1".to_vec()
        );
    }
}
