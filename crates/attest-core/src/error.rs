//! # Error Types — Shared Failure Taxonomy
//!
//! Defines the error types used throughout the Attest Ledger. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every validation or authorization failure maps onto one of four stable
//!   machine-readable codes: `not_found`, `already_exists`,
//!   `invalid_request`, `unauthorized`. Hosts route on [`LedgerError::code`],
//!   humans read `Display`.
//! - A proof or credential check that returns `false` is **not** represented
//!   here. Verification outcomes are ordinary data carried in responses.
//! - Errors are detected before any store write, so a returned error implies
//!   an untouched state.

use thiserror::Error;

/// The failure taxonomy for every command the ledger accepts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The referenced entity or DID does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"vc record"` or `"identity"`.
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// An entity with this identifier already exists; issuance never
    /// overwrites.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// Entity kind.
        entity: &'static str,
        /// The duplicate identifier.
        id: String,
    },

    /// Structurally invalid input: empty fields, bad dates, inactive DIDs,
    /// malformed payloads.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// The signer is not the principal this operation requires.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Human-readable rejection reason.
        reason: String,
    },
}

impl LedgerError {
    /// A `NotFound` error for the given entity kind and identifier.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// An `AlreadyExists` error for the given entity kind and identifier.
    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    /// An `InvalidRequest` error with the given reason.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// An `Unauthorized` error with the given reason.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// The stable machine-readable code for this error.
    ///
    /// These strings are part of the module's external contract and must not
    /// change between releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Unauthorized { .. } => "unauthorized",
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

impl From<CanonicalizationError> for LedgerError {
    fn from(err: CanonicalizationError) -> Self {
        LedgerError::invalid_request(format!("canonicalization error: {err}"))
    }
}
