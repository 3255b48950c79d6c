//! # attest-vc — Credential Ledger
//!
//! Owns plain verifiable-credential records: issuance, monotonic revocation,
//! the admin physical-delete path, and the two secondary indexes (by issuer
//! DID, by subject DID) that make range lookups possible while the primary
//! store stays keyed by credential id.
//!
//! - **Record** (`record.rs`): `VcRecord` and the derived
//!   `CredentialState` (`Active`/`Expired`/`Revoked`) — expiry is computed
//!   at read time, never persisted.
//!
//! - **Ledger** (`ledger.rs`): `CredentialLedger`, the owning component.
//!   Every mutation updates the primary record and both index entries
//!   through a single paired-write helper, so a live record and its index
//!   entries can never diverge.
//!
//! - **Proof** (`proof.rs`): Ed25519 credential proofs — signing over
//!   canonical bytes, verification against DID-oracle-resolved keys.
//!
//! ## Invariants
//!
//! - A credential id is globally unique at issuance; duplicates are
//!   rejected, never overwritten.
//! - Issuer and subject DIDs must resolve active at issuance time; later
//!   deactivation does not retroactively invalidate the record.
//! - Revocation is one-way (`revoked: false → true`), stamps `revoked_at`,
//!   and keeps both index entries — a revoked credential stays queryable.
//!   Only the physical-delete path tears down the indexes.

mod keys;
pub mod ledger;
pub mod proof;
pub mod record;

pub use ledger::CredentialLedger;
pub use proof::{
    Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, Proof, ProofError, ProofType,
    ED25519_KEY_TYPE,
};
pub use record::{CredentialState, VcIssuance, VcRecord};
