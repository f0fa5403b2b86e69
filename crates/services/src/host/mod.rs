// Path: crates/services/src/host/mod.rs
//! The serialization and commit boundary around a registry store.
//!
//! Every mutating call runs under one lock, against a copy-on-write overlay,
//! inside the caller's registry namespace. The overlay is committed with a
//! single `batch_apply` only if the call returns `Ok`; otherwise it is
//! dropped and the store is exactly as it was. Governance counters reported
//! during the call follow the same rule.

use parking_lot::Mutex;
use qgov_api::clock::HeightSource;
use qgov_api::context::CallContext;
use qgov_api::services::RegistryService;
use qgov_api::state::{
    registry_namespace_prefix, NamespacedStateAccess, ReadOnlyNamespacedStateAccess,
    StateAccess, StateOverlay,
};
use qgov_telemetry::time::DispatchTimer;
use qgov_telemetry::{error_metrics, service_metrics, DeferredMetrics};
use qgov_types::app::AccountId;
use qgov_types::error::{ErrorCode, RegistryError};
use std::sync::Arc;

/// Owns the store and the height source shared by a set of registries.
pub struct RegistryHost<S> {
    store: Mutex<S>,
    clock: Arc<dyn HeightSource>,
}

impl<S: StateAccess> RegistryHost<S> {
    pub fn new(store: S, clock: Arc<dyn HeightSource>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    /// The height the next call will observe.
    pub fn height(&self) -> u64 {
        self.clock.current_height()
    }

    /// Runs `f` as one atomic operation in `service_id`'s namespace.
    ///
    /// The height is read once, after the lock is taken, and handed to `f`
    /// through the `CallContext`.
    pub fn transact<R, F>(
        &self,
        service_id: &str,
        caller: &AccountId,
        f: F,
    ) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut dyn StateAccess, &CallContext) -> Result<R, RegistryError>,
    {
        let mut store = self.store.lock();
        let ctx = CallContext::new(self.clock.current_height(), caller.clone());
        let metrics = DeferredMetrics::begin();

        let outcome = {
            let mut overlay = StateOverlay::new(&*store);
            let result = {
                let mut namespaced = NamespacedStateAccess::new(
                    &mut overlay,
                    registry_namespace_prefix(service_id),
                );
                f(&mut namespaced, &ctx)
            };
            result.map(|value| (value, overlay.into_change_set()))
        };

        match outcome {
            Ok((value, changes)) => {
                changes.commit_to(&mut *store)?;
                metrics.commit();
                log::debug!(
                    "[Host] {} committed {} writes and {} deletes at height {}",
                    service_id,
                    changes.puts.len(),
                    changes.removes.len(),
                    ctx.block_height
                );
                Ok(value)
            }
            Err(e) => {
                log::warn!(
                    "[Host] {} call by {} failed at height {}: {}",
                    service_id,
                    ctx.caller,
                    ctx.block_height,
                    e
                );
                error_metrics().inc_error("registry", e.code());
                Err(e)
            }
        }
    }

    /// Runs a read-only `f` in `service_id`'s namespace. Writes are refused.
    pub fn query<R, F>(&self, service_id: &str, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&dyn StateAccess) -> Result<R, RegistryError>,
    {
        let store = self.store.lock();
        let view =
            ReadOnlyNamespacedStateAccess::new(&*store, registry_namespace_prefix(service_id));
        f(&view)
    }

    /// Dispatches an ABI call to `service` as one atomic operation.
    pub fn call(
        &self,
        service: &dyn RegistryService,
        caller: &AccountId,
        method: &str,
        params: &[u8],
    ) -> Result<Vec<u8>, RegistryError> {
        let _timer = DispatchTimer::new(service_metrics(), service.id(), method);
        let result = self.transact(service.id(), caller, |state, ctx| {
            service.handle_service_call(state, method, params, ctx)
        });
        if let Err(e) = &result {
            service_metrics().inc_dispatch_error(service.id(), method, e.code());
        }
        result
    }

    /// Gives read access to the raw, un-namespaced store.
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let store = self.store.lock();
        f(&*store)
    }

    /// Consumes the host and returns the store.
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }
}
