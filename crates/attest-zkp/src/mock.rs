//! # Mock Proof Verifier
//!
//! A deterministic, transparent proof backend. A proof is valid iff its
//! `proof_data` equals the SHA-256 hex digest of the canonical binding of
//! circuit id, public inputs, and public signals. Anyone holding the inputs
//! can mint a passing proof, so this backend provides **no zero-knowledge
//! privacy** — [`ProofBackendPolicy`](crate::policy::ProofBackendPolicy)
//! keeps it out of production.

use serde_json::{Map, Value};

use attest_core::{sha256_hex, CanonicalBytes};

use crate::credential::ZkProof;
use crate::policy::ProofBackend;
use crate::verifier::{ProofVerifier, VerifyError};

/// Deterministic digest-bound mock backend.
#[derive(Debug, Default)]
pub struct MockProofVerifier;

impl MockProofVerifier {
    /// The expected `proof_data` for a given binding.
    pub fn proof_data(
        circuit_id: &str,
        public_inputs: &Map<String, Value>,
        public_signals: &[String],
    ) -> Result<String, VerifyError> {
        let binding = serde_json::json!({
            "circuit_id": circuit_id,
            "public_inputs": public_inputs,
            "public_signals": public_signals,
        });
        let canonical = CanonicalBytes::new(&binding)
            .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        Ok(sha256_hex(&canonical))
    }

    /// Mint a proof that this backend will accept. Development/test helper.
    pub fn prove(
        circuit_id: &str,
        public_inputs: &Map<String, Value>,
        public_signals: Vec<String>,
    ) -> Result<ZkProof, VerifyError> {
        let proof_data = Self::proof_data(circuit_id, public_inputs, &public_signals)?;
        Ok(ZkProof {
            protocol: ProofBackend::Mock.name().to_string(),
            proof_data,
            public_signals,
            metadata: Map::new(),
        })
    }
}

impl ProofVerifier for MockProofVerifier {
    fn backend(&self) -> ProofBackend {
        ProofBackend::Mock
    }

    fn verify(
        &self,
        circuit_id: &str,
        public_inputs: &Map<String, Value>,
        proof: &ZkProof,
    ) -> Result<bool, VerifyError> {
        if proof.proof_data.is_empty() {
            return Err(VerifyError::MalformedProof("empty proof data".into()));
        }
        if !proof.proof_data.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerifyError::MalformedProof(
                "proof data is not hex".into(),
            ));
        }
        let expected = Self::proof_data(circuit_id, public_inputs, &proof.public_signals)?;
        Ok(proof.proof_data.eq_ignore_ascii_case(&expected))
    }
}
