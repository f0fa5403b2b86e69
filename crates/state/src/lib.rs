// Path: crates/state/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # qgov State
//!
//! Storage backends implementing `qgov_api::state::StateAccess`. The
//! registries only require a reliable keyed map, so the single backend is an
//! ordered in-memory store.

pub mod memory;
