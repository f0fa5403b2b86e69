// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # qgov Types
//!
//! This crate is the foundational library for the qgov governance registries,
//! containing the data model shared by every registry, the canonical codec,
//! the error taxonomy and the configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `qgov-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. Registry services,
//! the state layer and the CLI all agree on the definitions found here,
//! most importantly `Proposal`, `ProposalStatus` and `RegistryError`.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::RegistryError> = std::result::Result<T, E>;

/// Registry data structures: entities, proposals, votes and domain events.
pub mod app;
/// The canonical, deterministic binary codec for registry state.
pub mod codec;
/// Configuration structures shared by the services and the CLI.
pub mod config;
/// The error taxonomy used across the workspace.
pub mod error;
/// Constants for well-known state key prefixes.
pub mod keys;
