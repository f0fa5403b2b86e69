// Path: crates/api/src/lib.rs

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
//! # qgov API
//!
//! Core traits and interfaces for the qgov registries. This crate defines the
//! contract between the registry services, the store that backs them and the
//! host that serializes their execution.

/// The injected block-height source.
pub mod clock;
/// The per-call context handed to every service operation.
pub mod context;
/// Re-exports the error types from `qgov-types`.
pub mod error;
/// The `RegistryService` dispatch trait.
pub mod services;
/// Key/value state access, the copy-on-write overlay and namespacing.
pub mod state;

