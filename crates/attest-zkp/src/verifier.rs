//! # Proof Verifier Contract
//!
//! The abstract interface every proof backend must satisfy. Verification is
//! a pure, synchronous function of its inputs — no I/O, no clock, no
//! randomness — so it can run inside the deterministic transaction boundary.
//!
//! A cryptographically invalid proof is `Ok(false)`, not an error: failed
//! verification is a legitimate outcome surfaced to the caller. Errors are
//! reserved for structurally unusable input.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::credential::ZkProof;
use crate::policy::ProofBackend;

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof is structurally malformed (missing fields, bad encoding).
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

/// Abstract interface for a zero-knowledge proof backend.
///
/// The circuit named by `circuit_id` is an external, versioned contract
/// (circuit artifact plus verification key) owned outside this module; a
/// backend resolves it however it needs to.
pub trait ProofVerifier {
    /// Which backend this verifier implements, for policy checks.
    fn backend(&self) -> ProofBackend;

    /// Verify a proof against a circuit and its public inputs.
    ///
    /// Returns `Ok(true)` for a valid proof, `Ok(false)` for a well-formed
    /// but invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MalformedProof`] when the proof cannot be
    /// interpreted at all.
    fn verify(
        &self,
        circuit_id: &str,
        public_inputs: &Map<String, Value>,
        proof: &ZkProof,
    ) -> Result<bool, VerifyError>;
}
