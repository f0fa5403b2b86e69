// Path: crates/cli/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # qgov CLI Library
//!
//! Drives the three registries the way a user would: a JSON script of steps
//! is executed against a `RegistryHost` backed by an in-memory store and a
//! manual clock, and every step yields one JSON outcome.
//!
//! The crate only uses the public APIs of the `qgov-*` libraries. It holds no
//! registry logic of its own.

/// Loading and writing `RegistryConfig` files.
pub mod config;
/// Executes scripts against an in-memory host.
pub mod runner;
/// The JSON script format.
pub mod script;

pub use config::load_config;
pub use runner::{ScriptRunner, StepOutcome};
pub use script::{Operation, Script, Step};
