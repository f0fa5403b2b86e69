// Path: crates/test_utils/src/lib.rs
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

//! # qgov Test Utilities
//!
//! Assertion macros and fixtures shared by the qgov test suites.

pub mod assertions;
pub mod fixtures;
