//! # Credential Proofs — Ed25519
//!
//! Signing and verification for credential proofs. The signing input is
//! always `&CanonicalBytes`, so a proof can only ever cover canonicalized
//! data, and verification resolves the signing key through the DID oracle —
//! the proof names its verification method as a DID URL, the oracle supplies
//! the published key, and a deactivated controller fails verification.
//!
//! Private keys are never serialized: `Ed25519KeyPair` implements neither
//! `Serialize` nor `Debug`-with-contents.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use attest_core::{CanonicalBytes, Did, DidOracle, Timestamp};

/// Key suite name expected on oracle-published verification methods.
pub const ED25519_KEY_TYPE: &str = "Ed25519VerificationKey2020";

/// Error during credential proof verification.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The verification method is not a `did:…#fragment` DID URL.
    #[error("malformed verification method: {0}")]
    MalformedMethod(String),
    /// The controller DID did not resolve.
    #[error("controller DID not found: {0}")]
    UnknownController(String),
    /// The controller DID resolved but is deactivated.
    #[error("controller DID is deactivated: {0}")]
    InactiveController(String),
    /// The controller's document does not publish this method.
    #[error("verification method not published: {0}")]
    UnknownMethod(String),
    /// The published method uses a key suite this module cannot check.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
    /// Key or signature bytes are malformed.
    #[error("key error: {0}")]
    Key(String),
    /// The signature does not cover the payload.
    #[error("signature verification failed")]
    SignatureInvalid,
}

/// The type of cryptographic proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 digital signature proof.
    Ed25519Signature2020,
}

/// A cryptographic proof attached to a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// The type of proof.
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    /// When the proof was created.
    pub created: Timestamp,
    /// Why the proof was attached, e.g. `assertionMethod`.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,
    /// DID URL of the verification method, e.g. `did:attest:a#keys-1`.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    /// Hex-encoded signature bytes.
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

impl Proof {
    /// Sign a canonical payload, producing a proof bound to the given
    /// verification method.
    pub fn sign(
        keypair: &Ed25519KeyPair,
        verification_method: impl Into<String>,
        proof_purpose: impl Into<String>,
        created: Timestamp,
        payload: &CanonicalBytes,
    ) -> Self {
        let signature = keypair.sign(payload);
        Self {
            proof_type: ProofType::Ed25519Signature2020,
            created,
            proof_purpose: proof_purpose.into(),
            verification_method: verification_method.into(),
            proof_value: signature.to_hex(),
        }
    }

    /// Verify this proof over a canonical payload, resolving the signing key
    /// through the DID oracle.
    ///
    /// # Errors
    ///
    /// Fails when the verification method is malformed, its controller DID
    /// is unknown or deactivated, the method is not published, the key suite
    /// is unsupported, or the signature does not check out.
    pub fn verify(
        &self,
        payload: &CanonicalBytes,
        oracle: &dyn DidOracle,
    ) -> Result<(), ProofError> {
        let (controller, _fragment) = self
            .verification_method
            .split_once('#')
            .ok_or_else(|| ProofError::MalformedMethod(self.verification_method.clone()))?;
        let controller_did = Did::parse(controller)
            .map_err(|_| ProofError::MalformedMethod(self.verification_method.clone()))?;

        let record = oracle
            .lookup(&controller_did)
            .ok_or_else(|| ProofError::UnknownController(controller.to_string()))?;
        if !record.active {
            return Err(ProofError::InactiveController(controller.to_string()));
        }

        let method = record
            .document
            .verification_method(&self.verification_method)
            .ok_or_else(|| ProofError::UnknownMethod(self.verification_method.clone()))?;
        if method.key_type != ED25519_KEY_TYPE {
            return Err(ProofError::UnsupportedKeyType(method.key_type.clone()));
        }

        let public_key = Ed25519PublicKey::from_hex(&method.public_key_hex)?;
        let signature = Ed25519Signature::from_hex(&self.proof_value)?;
        let verifying_key = public_key.to_verifying_key()?;
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        verifying_key
            .verify(payload.as_bytes(), &sig)
            .map_err(|_| ProofError::SignatureInvalid)
    }
}

// ---------------------------------------------------------------------------
// Ed25519 primitives
// ---------------------------------------------------------------------------

/// An Ed25519 public key (32 bytes), hex-encoded at rest.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ProofError> {
        let bytes = hex_to_bytes(hex)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ProofError::Key("public key hex must be 64 chars".into()))?;
        Ok(Self(arr))
    }

    /// Convert to a dalek verifying key.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, ProofError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| ProofError::Key(format!("invalid public key: {e}")))
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}…)", &self.to_hex()[..8])
    }
}

/// An Ed25519 signature (64 bytes), hex-encoded at rest.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// The raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ProofError> {
        let bytes = hex_to_bytes(hex)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| ProofError::Key("signature hex must be 128 chars".into()))?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}…)", &self.to_hex()[..8])
    }
}

/// An Ed25519 key pair for proof signing.
///
/// Constructed only from an explicit seed — the ledger itself never
/// generates keys, and there is no `Serialize` impl that could leak the
/// private half.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519KeyPair {
    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public key for this pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ed25519KeyPair(<private>)")
    }
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, ProofError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(ProofError::Key("hex string must have even length".into()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ProofError::Key(format!("invalid hex at position {i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::{MemoryDidOracle, VerificationMethod};

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    fn ts() -> Timestamp {
        Timestamp::parse("2026-01-15T12:00:00Z").unwrap()
    }

    fn payload() -> CanonicalBytes {
        CanonicalBytes::new(&serde_json::json!({"claim": "age_over_18"})).unwrap()
    }

    fn oracle_with_key(keypair: &Ed25519KeyPair) -> MemoryDidOracle {
        let mut oracle = MemoryDidOracle::new();
        oracle.register(
            did("did:attest:issuer"),
            vec![VerificationMethod {
                id: "did:attest:issuer#keys-1".to_string(),
                key_type: ED25519_KEY_TYPE.to_string(),
                public_key_hex: keypair.public_key().to_hex(),
            }],
        );
        oracle
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let oracle = oracle_with_key(&keypair);
        let proof = Proof::sign(
            &keypair,
            "did:attest:issuer#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        proof.verify(&payload(), &oracle).unwrap();
    }

    #[test]
    fn test_tampered_payload_fails() {
        let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let oracle = oracle_with_key(&keypair);
        let proof = Proof::sign(
            &keypair,
            "did:attest:issuer#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        let other = CanonicalBytes::new(&serde_json::json!({"claim": "tampered"})).unwrap();
        assert!(matches!(
            proof.verify(&other, &oracle),
            Err(ProofError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let published = Ed25519KeyPair::from_seed(&[2u8; 32]);
        let oracle = oracle_with_key(&published);
        let proof = Proof::sign(
            &signer,
            "did:attest:issuer#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        assert!(proof.verify(&payload(), &oracle).is_err());
    }

    #[test]
    fn test_deactivated_controller_fails() {
        let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let mut oracle = oracle_with_key(&keypair);
        oracle.deactivate(&did("did:attest:issuer"));
        let proof = Proof::sign(
            &keypair,
            "did:attest:issuer#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        assert!(matches!(
            proof.verify(&payload(), &oracle),
            Err(ProofError::InactiveController(_))
        ));
    }

    #[test]
    fn test_unknown_controller_and_method() {
        let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let oracle = oracle_with_key(&keypair);

        let mut proof = Proof::sign(
            &keypair,
            "did:attest:stranger#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        assert!(matches!(
            proof.verify(&payload(), &oracle),
            Err(ProofError::UnknownController(_))
        ));

        proof.verification_method = "did:attest:issuer#keys-9".to_string();
        assert!(matches!(
            proof.verify(&payload(), &oracle),
            Err(ProofError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_malformed_method_rejected() {
        let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let oracle = oracle_with_key(&keypair);
        let mut proof = Proof::sign(
            &keypair,
            "did:attest:issuer#keys-1",
            "assertionMethod",
            ts(),
            &payload(),
        );
        proof.verification_method = "no-fragment".to_string();
        assert!(matches!(
            proof.verify(&payload(), &oracle),
            Err(ProofError::MalformedMethod(_))
        ));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let a = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let b = Ed25519KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.sign(&payload()), b.sign(&payload()));
    }

    #[test]
    fn test_hex_roundtrips_and_rejects() {
        let keypair = Ed25519KeyPair::from_seed(&[3u8; 32]);
        let pk = keypair.public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(Ed25519PublicKey::from_hex("zz").is_err());
        assert!(Ed25519Signature::from_hex("aabb").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let keypair = Ed25519KeyPair::from_seed(&[3u8; 32]);
        assert_eq!(format!("{keypair:?}"), "Ed25519KeyPair(<private>)");
    }
}
