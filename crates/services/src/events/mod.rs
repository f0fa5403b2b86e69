// Path: crates/services/src/events/mod.rs
//! A write-once log of domain events.

use parity_scale_codec::{Decode, Encode};
use qgov_api::state::{get_decoded, put_encoded, StateAccess};
use qgov_telemetry::governance_metrics;
use qgov_types::error::RegistryError;
use qgov_types::keys::event_key;

/// Immutable records keyed by `(entity id, event id)` for one event kind.
///
/// A key can be written exactly once; there is no update or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLog {
    kind: &'static str,
}

impl EventLog {
    /// Creates the log for events of `kind` (e.g. "observation").
    pub const fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    pub fn get<T: Decode>(
        &self,
        state: &dyn StateAccess,
        entity_id: &str,
        event_id: &str,
    ) -> Result<Option<T>, RegistryError> {
        Ok(get_decoded(state, &event_key(self.kind, entity_id, event_id))?)
    }

    /// Stores `record`, failing with `AlreadyExists` if the key was used before.
    pub fn append<T: Encode>(
        &self,
        state: &mut dyn StateAccess,
        entity_id: &str,
        event_id: &str,
        record: &T,
    ) -> Result<(), RegistryError> {
        let key = event_key(self.kind, entity_id, event_id);
        if state.get(&key)?.is_some() {
            return Err(RegistryError::already_exists(
                self.kind,
                format!("{}/{}", entity_id, event_id),
            ));
        }
        put_encoded(state, &key, record)?;
        log::info!(
            "[Events] Recorded {} '{}' for '{}'",
            self.kind,
            event_id,
            entity_id
        );
        governance_metrics().inc_domain_events(self.kind);
        Ok(())
    }
}
