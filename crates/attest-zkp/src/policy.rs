//! # Proof Backend Policy
//!
//! The mock backend produces transparent SHA-256 "proofs" with zero
//! cryptographic security. If a verifier accepted them in production, an
//! attacker could mint proofs without possessing the witness. The policy
//! gate makes that impossible: production mode rejects the mock backend
//! unconditionally, and the rejection surfaces as a failed verification
//! outcome.
//!
//! The mode is fixed at construction. There is no environment probe — the
//! host wires the policy in explicitly, keeping replay deterministic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from proof policy enforcement.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Mock proof rejected in production mode.
    #[error("mock proof rejected: production mode requires a real proof backend ({backend})")]
    MockProofRejected {
        /// The proof backend that was rejected.
        backend: String,
    },
}

/// The proof backend that produced a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofBackend {
    /// Deterministic SHA-256 mock — no cryptographic security.
    Mock,
    /// Groth16 SNARK.
    Groth16,
    /// PLONK.
    Plonk,
}

impl ProofBackend {
    /// Whether this backend provides real cryptographic security.
    pub fn is_real(self) -> bool {
        matches!(self, ProofBackend::Groth16 | ProofBackend::Plonk)
    }

    /// Human-readable name, also the `ZkProof.protocol` wire value.
    pub fn name(self) -> &'static str {
        match self {
            ProofBackend::Mock => "mock-sha256",
            ProofBackend::Groth16 => "groth16",
            ProofBackend::Plonk => "plonk",
        }
    }

    /// Resolve a `ZkProof.protocol` string to a backend.
    pub fn from_protocol(protocol: &str) -> Option<Self> {
        match protocol {
            "mock-sha256" | "mock" => Some(ProofBackend::Mock),
            "groth16" => Some(ProofBackend::Groth16),
            "plonk" => Some(ProofBackend::Plonk),
            _ => None,
        }
    }
}

/// Proof policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyMode {
    /// Production: reject mock proofs unconditionally.
    Production,
    /// Development: accept mock proofs.
    Development,
}

/// Runtime policy deciding whether a proof backend is acceptable for the
/// current deployment.
#[derive(Debug, Clone)]
pub struct ProofBackendPolicy {
    mode: PolicyMode,
}

impl ProofBackendPolicy {
    /// Create a policy with the given mode.
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    /// A production policy (rejects mock proofs).
    pub fn production() -> Self {
        Self::new(PolicyMode::Production)
    }

    /// A development policy (accepts mock proofs).
    pub fn development() -> Self {
        Self::new(PolicyMode::Development)
    }

    /// Validate a proof backend under this policy.
    pub fn validate(&self, backend: ProofBackend) -> Result<(), PolicyError> {
        match self.mode {
            PolicyMode::Production if backend == ProofBackend::Mock => {
                Err(PolicyError::MockProofRejected {
                    backend: backend.name().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Current policy mode.
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_rejects_mock() {
        assert!(ProofBackendPolicy::production()
            .validate(ProofBackend::Mock)
            .is_err());
    }

    #[test]
    fn production_accepts_real_backends() {
        let policy = ProofBackendPolicy::production();
        assert!(policy.validate(ProofBackend::Groth16).is_ok());
        assert!(policy.validate(ProofBackend::Plonk).is_ok());
    }

    #[test]
    fn development_accepts_everything() {
        let policy = ProofBackendPolicy::development();
        assert!(policy.validate(ProofBackend::Mock).is_ok());
        assert!(policy.validate(ProofBackend::Groth16).is_ok());
    }

    #[test]
    fn mock_backend_is_not_real() {
        assert!(!ProofBackend::Mock.is_real());
        assert!(ProofBackend::Groth16.is_real());
        assert!(ProofBackend::Plonk.is_real());
    }

    #[test]
    fn protocol_names_roundtrip() {
        for backend in [ProofBackend::Mock, ProofBackend::Groth16, ProofBackend::Plonk] {
            assert_eq!(ProofBackend::from_protocol(backend.name()), Some(backend));
        }
        assert_eq!(ProofBackend::from_protocol("mock"), Some(ProofBackend::Mock));
        assert_eq!(ProofBackend::from_protocol("stark"), None);
    }

    #[test]
    fn error_message_includes_backend() {
        let err = ProofBackendPolicy::production()
            .validate(ProofBackend::Mock)
            .unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("mock-sha256"));
        assert!(msg.contains("production mode"));
    }
}
