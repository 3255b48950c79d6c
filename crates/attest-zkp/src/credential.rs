//! # ZK Credentials
//!
//! `ZkCredential` records carry opaque proof blobs bound to a named circuit
//! instead of plaintext claims. The subsystem applies the same store
//! discipline as the credential ledger: a primary record keyed by id and a
//! by-holder secondary index, maintained through one paired-write helper.
//!
//! Issuance verifies the proof up front — a credential whose proof never
//! verified is not recorded. Later `verify` calls re-run the backend and
//! report the outcome as data; the caller appends the audit-trail entry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use attest_core::{BlockContext, Did, LedgerError, Timestamp, ZkCredentialId};
use attest_store::{get_json, next_sequence, put_json, MemoryKvStore};

use crate::keys::{ZK_BY_HOLDER, ZK_CREDENTIALS, ZK_SEQUENCE_KEY};
use crate::policy::{ProofBackend, ProofBackendPolicy};
use crate::verifier::ProofVerifier;

/// An opaque zero-knowledge proof blob plus its protocol tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    /// Backend protocol name, e.g. `groth16` or `mock-sha256`.
    pub protocol: String,
    /// Opaque proof payload (backend-defined encoding).
    pub proof_data: String,
    /// Public signals exposed by the proof.
    pub public_signals: Vec<String>,
    /// Backend-defined metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Privacy posture of a ZK credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    /// Minimal hiding; public inputs may identify the holder.
    Basic,
    /// Holder hidden within the anonymity set.
    Enhanced,
    /// Full unlinkability.
    Maximum,
}

impl PrivacyLevel {
    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Enhanced => "enhanced",
            Self::Maximum => "maximum",
        }
    }
}

/// Privacy parameters recorded with a ZK credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyParameters {
    /// Seed for nullifier derivation, preventing proof reuse.
    pub nullifier_seed: String,
    /// Commitment scheme the circuit expects, e.g. `pedersen`.
    pub commitment_scheme: String,
    /// DIDs forming the anonymity set, if any.
    #[serde(default)]
    pub anonymity_set: Vec<String>,
    /// Declared privacy level.
    pub privacy_level: PrivacyLevel,
}

/// A stored zero-knowledge credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkCredential {
    /// Unique credential id, minted by the subsystem.
    pub id: ZkCredentialId,
    /// DID of the holder the credential is bound to.
    pub holder_did: Did,
    /// The external circuit this credential proves against.
    pub circuit_id: String,
    /// Public inputs the proof commits to.
    pub public_inputs: Map<String, Value>,
    /// The proof blob.
    pub proof: ZkProof,
    /// Reference to the circuit's verification key.
    pub verification_key: String,
    /// Schema reference derived from the circuit.
    pub credential_schema: String,
    /// Privacy parameters.
    pub privacy: PrivacyParameters,
    /// Whether the credential supports selective disclosure.
    pub selective_disclosure: bool,
    /// Issuance instant (block time).
    pub created_at: Timestamp,
}

/// Parameters for issuing a ZK credential.
#[derive(Debug, Clone)]
pub struct ZkIssuance {
    /// Holder DID; existence is checked by the dispatcher against the
    /// identity registry before issuance reaches this component.
    pub holder_did: Did,
    /// The circuit to bind against.
    pub circuit_id: String,
    /// Public inputs the proof commits to.
    pub public_inputs: Map<String, Value>,
    /// The proof blob.
    pub proof: ZkProof,
    /// Privacy parameters.
    pub privacy: PrivacyParameters,
}

/// Outcome of a proof verification attempt. Data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkVerification {
    /// The credential whose proof was checked.
    pub zk_credential_id: ZkCredentialId,
    /// The circuit the credential is bound to.
    pub circuit_id: String,
    /// Whether the proof verified.
    pub is_valid: bool,
    /// Why, in either direction.
    pub reason: String,
}

/// The ZK credential subsystem: store, verifier backend, and backend policy.
pub struct ZkSubsystem {
    store: MemoryKvStore,
    verifier: Box<dyn ProofVerifier>,
    policy: ProofBackendPolicy,
}

impl ZkSubsystem {
    /// Create the subsystem over an injected store, backend, and policy.
    pub fn new(
        store: MemoryKvStore,
        verifier: Box<dyn ProofVerifier>,
        policy: ProofBackendPolicy,
    ) -> Self {
        Self {
            store,
            verifier,
            policy,
        }
    }

    /// Issue a ZK credential.
    ///
    /// The proof must be structurally present, pass the backend policy, and
    /// verify against the circuit — a credential is never recorded with a
    /// proof that did not verify at issuance.
    pub fn issue(
        &mut self,
        ctx: &BlockContext,
        issuance: ZkIssuance,
    ) -> Result<ZkCredential, LedgerError> {
        self.validate_structure(&issuance)?;
        let backend = self.resolve_backend(&issuance.proof)?;
        self.policy
            .validate(backend)
            .map_err(|e| LedgerError::invalid_request(e.to_string()))?;

        let valid = self
            .verifier
            .verify(
                &issuance.circuit_id,
                &issuance.public_inputs,
                &issuance.proof,
            )
            .map_err(|e| LedgerError::invalid_request(e.to_string()))?;
        if !valid {
            return Err(LedgerError::invalid_request(
                "ZK proof verification failed at issuance",
            ));
        }

        let seq = next_sequence(&mut self.store, ZK_SEQUENCE_KEY);
        let id = ZkCredentialId::new(format!("zkcred-{}-{}", ctx.height, seq));
        let credential = ZkCredential {
            id: id.clone(),
            holder_did: issuance.holder_did,
            verification_key: format!("vk-{}", issuance.circuit_id),
            credential_schema: format!(
                "https://attest-ledger.org/schemas/zk/{}",
                issuance.circuit_id
            ),
            circuit_id: issuance.circuit_id,
            public_inputs: issuance.public_inputs,
            proof: issuance.proof,
            privacy: issuance.privacy,
            selective_disclosure: true,
            created_at: ctx.now,
        };
        self.write_credential(&credential)?;

        info!(
            zk_credential_id = %credential.id,
            holder_did = %credential.holder_did,
            circuit_id = %credential.circuit_id,
            "zk credential issued"
        );
        Ok(credential)
    }

    /// Re-verify a stored credential's proof.
    ///
    /// Read-only: the outcome is returned as data and the caller records the
    /// audit-trail entry regardless of result. A policy rejection or a
    /// structurally unusable proof is a failed outcome, not an error.
    pub fn verify(&self, id: &ZkCredentialId) -> Result<ZkVerification, LedgerError> {
        let credential = self
            .get(id)?
            .ok_or_else(|| LedgerError::not_found("zk credential", id.as_str()))?;

        let (is_valid, reason) = match self.check(&credential) {
            Ok(()) => (true, "proof verified".to_string()),
            Err(reason) => (false, reason),
        };
        Ok(ZkVerification {
            zk_credential_id: credential.id,
            circuit_id: credential.circuit_id,
            is_valid,
            reason,
        })
    }

    /// Point lookup by id.
    pub fn get(&self, id: &ZkCredentialId) -> Result<Option<ZkCredential>, LedgerError> {
        get_json(&self.store, &ZK_CREDENTIALS.record_key(id.as_str()))
    }

    /// All ZK credentials bound to a holder DID, in index order.
    pub fn credentials_by_holder(&self, holder: &Did) -> Result<Vec<ZkCredential>, LedgerError> {
        let ids: Vec<String> = self
            .store
            .prefix_scan(&ZK_BY_HOLDER.group_prefix(holder.as_str()))
            .map(|(_, v)| String::from_utf8_lossy(v).into_owned())
            .collect();

        let mut credentials = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(credential) = self.get(&ZkCredentialId::new(&id))? {
                credentials.push(credential);
            } else {
                debug!(zk_credential_id = %id, "skipping dangling index entry");
            }
        }
        Ok(credentials)
    }

    fn validate_structure(&self, issuance: &ZkIssuance) -> Result<(), LedgerError> {
        if issuance.circuit_id.is_empty() {
            return Err(LedgerError::invalid_request("circuit id cannot be empty"));
        }
        if issuance.proof.protocol.is_empty() || issuance.proof.proof_data.is_empty() {
            return Err(LedgerError::invalid_request("malformed proof structure"));
        }
        if issuance.privacy.commitment_scheme.is_empty() {
            return Err(LedgerError::invalid_request(
                "commitment scheme cannot be empty",
            ));
        }
        Ok(())
    }

    fn resolve_backend(&self, proof: &ZkProof) -> Result<ProofBackend, LedgerError> {
        ProofBackend::from_protocol(&proof.protocol).ok_or_else(|| {
            LedgerError::invalid_request(format!("unknown proof protocol: {}", proof.protocol))
        })
    }

    /// Full verification pipeline; the error string is the failure reason.
    fn check(&self, credential: &ZkCredential) -> Result<(), String> {
        let backend = self
            .resolve_backend(&credential.proof)
            .map_err(|e| e.to_string())?;
        self.policy.validate(backend).map_err(|e| e.to_string())?;
        match self.verifier.verify(
            &credential.circuit_id,
            &credential.public_inputs,
            &credential.proof,
        ) {
            Ok(true) => Ok(()),
            Ok(false) => Err("proof verification failed".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Write the primary record plus the by-holder index entry. The single
    /// call site that keeps record and index 1:1.
    fn write_credential(&mut self, credential: &ZkCredential) -> Result<(), LedgerError> {
        put_json(
            &mut self.store,
            ZK_CREDENTIALS.record_key(credential.id.as_str()),
            credential,
        )?;
        self.store.set(
            ZK_BY_HOLDER.index_key(credential.holder_did.as_str(), credential.id.as_str()),
            credential.id.as_str().as_bytes().to_vec(),
        );
        Ok(())
    }
}
