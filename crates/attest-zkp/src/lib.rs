//! # attest-zkp — Zero-Knowledge Credential Subsystem
//!
//! Issues and verifies privacy-preserving credentials bound to a named
//! circuit. The subsystem stores opaque proof blobs and never interprets
//! them beyond structural presence — interpreting a proof is the job of a
//! [`ProofVerifier`] backend.
//!
//! ## Architecture
//!
//! - **Verifier** (`verifier.rs`): the `ProofVerifier` trait — the
//!   pluggable `verify(circuit_id, public_inputs, proof) → bool` contract.
//!   Real proof systems (Groth16, PLONK) plug in behind it; the circuit
//!   identified by `circuit_id` is an external, versioned contract this
//!   module does not own.
//!
//! - **Mock** (`mock.rs`): `MockProofVerifier`, a deterministic backend — a
//!   proof is valid iff its `proof_data` is the SHA-256 digest of the
//!   canonical (circuit id, public inputs, public signals) binding. No
//!   zero-knowledge privacy; useful for development and as the executable
//!   definition of the contract.
//!
//! - **Policy** (`policy.rs`): `ProofBackendPolicy` — production mode
//!   rejects the mock backend, so transparent proofs can never be accepted
//!   as authoritative in a production deployment.
//!
//! - **Credential** (`credential.rs`): `ZkSubsystem`, the owning component.
//!   Follows the same store discipline as the credential ledger: primary
//!   record by id plus a by-holder secondary index, written through one
//!   paired helper.

pub mod credential;
mod keys;
pub mod mock;
pub mod policy;
pub mod verifier;

pub use credential::{
    PrivacyLevel, PrivacyParameters, ZkCredential, ZkIssuance, ZkProof, ZkSubsystem,
    ZkVerification,
};
pub use mock::MockProofVerifier;
pub use policy::{PolicyError, PolicyMode, ProofBackend, ProofBackendPolicy};
pub use verifier::{ProofVerifier, VerifyError};
