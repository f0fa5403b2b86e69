// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # qgov Services
//!
//! The proposal lifecycle shared by every registry (`governance`), the
//! write-once domain event log (`events`), the three registries built on
//! them, and the `RegistryHost` that serializes calls and commits each one
//! atomically.

pub mod duality;
pub mod events;
pub mod field_consensus;
pub mod fluctuation_regulation;
pub mod governance;
pub mod host;

pub use duality::DualityService;
pub use field_consensus::FieldConsensusService;
pub use fluctuation_regulation::FluctuationRegulationService;
pub use governance::GovernanceEngine;
pub use host::RegistryHost;
