// Path: crates/types/src/error/mod.rs
//! Core error types for the qgov registries.

use crate::app::ProposalStatus;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors related to the underlying key/value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// A stored value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A write was attempted through a read-only view, or a key escaped its namespace.
    #[error("Permission denied for state key: {0}")]
    PermissionDenied(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::Decode(_) => "STATE_DECODE_ERROR",
            Self::PermissionDenied(_) => "STATE_PERMISSION_DENIED",
        }
    }
}

/// The flat classification of a registry failure.
///
/// Every failing registry operation reports exactly one of these kinds.
/// `State` only appears when the backing store itself misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A create-type operation reused an identifier.
    AlreadyExists,
    /// A referenced entity, proposal or record is absent.
    NotFound,
    /// The proposal has already left the `open` status.
    InvalidState,
    /// Finalization attempted before the voting deadline.
    TooEarly,
    /// A vote arrived at or after the voting deadline.
    DeadlinePassed,
    /// The input is structurally invalid.
    InvalidArgument,
    /// An accumulation would exceed the representable range.
    Overflow,
    /// The backing store failed.
    State,
}

/// Errors returned by registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An identifier passed to a create-type operation is already in use.
    #[error("{kind} '{id}' already exists")]
    AlreadyExists {
        /// The kind of record (e.g. "field", "proposal", "observation").
        kind: &'static str,
        /// The conflicting identifier.
        id: String,
    },
    /// A referenced record does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// The kind of record that was looked up.
        kind: &'static str,
        /// The missing identifier.
        id: String,
    },
    /// The proposal is no longer open.
    #[error("Proposal '{id}' is {status}, not open")]
    InvalidState {
        /// The proposal identifier.
        id: String,
        /// The status the proposal is in.
        status: ProposalStatus,
    },
    /// The proposal cannot be finalized yet.
    #[error("Proposal '{id}' cannot be finalized before height {deadline} (current height {height})")]
    TooEarly {
        /// The proposal identifier.
        id: String,
        /// The height at which voting closes.
        deadline: u64,
        /// The height at which finalization was attempted.
        height: u64,
    },
    /// The voting window for the proposal has closed.
    #[error("Voting on proposal '{id}' closed at height {deadline} (current height {height})")]
    DeadlinePassed {
        /// The proposal identifier.
        id: String,
        /// The height at which voting closed.
        deadline: u64,
        /// The height at which the vote was attempted.
        height: u64,
    },
    /// The input is structurally invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// An arithmetic accumulation would overflow.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
    /// An error originating from the state layer.
    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl RegistryError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::TooEarly { .. } => ErrorKind::TooEarly,
            Self::DeadlinePassed { .. } => ErrorKind::DeadlinePassed,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Overflow(_) => ErrorKind::Overflow,
            Self::State(_) => ErrorKind::State,
        }
    }

    /// Shorthand for an `AlreadyExists` error.
    pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "REGISTRY_ALREADY_EXISTS",
            Self::NotFound { .. } => "REGISTRY_NOT_FOUND",
            Self::InvalidState { .. } => "REGISTRY_INVALID_STATE",
            Self::TooEarly { .. } => "REGISTRY_TOO_EARLY",
            Self::DeadlinePassed { .. } => "REGISTRY_DEADLINE_PASSED",
            Self::InvalidArgument(_) => "REGISTRY_INVALID_ARGUMENT",
            Self::Overflow(_) => "REGISTRY_OVERFLOW",
            Self::State(e) => e.code(),
        }
    }
}
