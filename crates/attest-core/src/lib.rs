//! # attest-core — Foundational Types for the Attest Ledger
//!
//! This crate is the bedrock of the Attest Ledger workspace. It defines the
//! type-system primitives shared by every other crate: identifier newtypes,
//! the UTC-only timestamp, canonical byte production, the error taxonomy,
//! structured events, the block execution context, and the DID oracle
//! interface. Every other crate in the workspace depends on `attest-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Did`, `AccountId`,
//!    `IdentityId`, `CredentialId`, `ZkCredentialId` — all newtypes with
//!    validated constructors where validation applies. No bare strings for
//!    identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** All digest and signature computation
//!    flows through `CanonicalBytes::new()`. No raw `serde_json::to_vec()`
//!    for digests.
//!
//! 3. **One error taxonomy.** `LedgerError` carries the four machine-readable
//!    failure codes (`not_found`, `already_exists`, `invalid_request`,
//!    `unauthorized`). A failed verification is *not* an error — it is a
//!    plain result surfaced to the caller.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Time never enters the ledger through a
//!    wall clock — only through [`BlockContext`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `attest-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a storage or wire boundary.

pub mod canonical;
pub mod context;
pub mod did;
pub mod digest;
pub mod error;
pub mod event;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use context::BlockContext;
pub use did::{DidDocument, DidOracle, DidRecord, MemoryDidOracle, VerificationMethod};
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::LedgerError;
pub use event::{Event, EventAttribute};
pub use identity::{
    AccountId, AuditId, CredentialId, Did, IdentityId, PermissionId, ZkCredentialId,
};
pub use temporal::Timestamp;
