// Path: crates/api/src/services/mod.rs
//! The dispatch trait implemented by every registry.

use crate::context::CallContext;
use crate::state::StateAccess;
use qgov_types::error::RegistryError;

/// The base trait for any registry managed by a host.
///
/// # Storage Invariant: Namespaced Access
///
/// All reads and writes performed by a registry via `handle_service_call` are
/// scoped to a private namespace. The `StateAccess` passed to the service is a
/// `NamespacedStateAccess`, so a key `k` is physically stored as
/// `_registry::{service_id}::{k}`.
///
/// When seeding state directly in tests, the namespacing is **NOT** applied
/// automatically; build the full key with
/// `qgov_api::state::registry_namespace_prefix(service_id)` followed by the key.
pub trait RegistryService: Send + Sync {
    /// A unique, static, lowercase identifier for the registry.
    fn id(&self) -> &str;

    /// The method names accepted by `handle_service_call`.
    fn methods(&self) -> &'static [&'static str];

    /// Handles a dispatched call. `params` and the returned bytes are
    /// SCALE-encoded; their layouts are defined by each registry.
    ///
    /// # Default Implementation
    /// The default implementation rejects every method with `InvalidArgument`.
    fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &CallContext,
    ) -> Result<Vec<u8>, RegistryError> {
        let _ = (state, params, ctx);
        Err(RegistryError::InvalidArgument(format!(
            "Registry '{}' does not support method '{}'",
            self.id(),
            method
        )))
    }
}
