//! # Command and Response Envelopes
//!
//! One payload struct per command, collected in the [`Msg`] enum. Identifier
//! fields are typed newtypes, so DID and account shape is enforced at
//! construction; `validate_basic` covers the remaining well-formedness
//! checks (non-empty ids and payload fields, structurally present proofs)
//! before a command touches any component.
//!
//! `signer()` names the principal whose signature the host must have
//! checked. Authorization against stored state (issuer-only revocation,
//! capability grants) happens in the components, not here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use attest_core::{
    AccountId, CredentialId, Did, IdentityId, LedgerError, PermissionId, Timestamp,
    ZkCredentialId,
};
use attest_identity::{
    AuditResult, AuditType, ComplianceUpdate, CredentialVerification, IdentityUpdates,
    Permission, ProtocolIdentity, ProtocolType, SecurityLevel,
};
use attest_vc::Proof;
use attest_zkp::{PrivacyLevel, PrivacyParameters, ZkProof, ZkVerification};

/// Issue a credential into the credential ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgIssueVc {
    /// Signing account; recorded as the only principal allowed to revoke.
    pub issuer: AccountId,
    /// Caller-chosen credential id.
    pub id: CredentialId,
    /// DID of the issuing party.
    pub issuer_did: Did,
    /// DID of the credential subject.
    pub subject_did: Did,
    /// Schema reference for the payload.
    pub credential_schema: String,
    /// Opaque credential payload.
    pub credential_data: String,
    /// Opaque issuance proof.
    pub proof: String,
    /// Expiry instant, strictly in the future at issuance.
    pub expires_at: Timestamp,
}

/// Revoke a ledger credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgRevokeVc {
    /// Signing account; must match the recorded issuer.
    pub creator: AccountId,
    /// The credential to revoke.
    pub credential_id: CredentialId,
}

/// Create a universal identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgCreateIdentity {
    /// Signing account.
    pub creator: AccountId,
    /// Zero or more protocol sub-identities to seed.
    pub initial_protocols: Vec<ProtocolIdentity>,
    /// Security posture to assign.
    pub security_level: SecurityLevel,
}

/// Apply a partial update to an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgUpdateIdentity {
    /// The identity to update.
    pub identity_id: IdentityId,
    /// Signing account.
    pub updater: AccountId,
    /// The fields to change.
    pub updates: IdentityUpdates,
}

/// Insert or overwrite a protocol sub-identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgAddProtocolIdentity {
    /// The identity to extend.
    pub identity_id: IdentityId,
    /// Signing account.
    pub requestor: AccountId,
    /// The entry to add, keyed by its protocol.
    pub entry: ProtocolIdentity,
}

/// Issue a W3C-enveloped credential about a registered subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgIssueCredential {
    /// Signing account (or DID string) of the issuer.
    pub issuer: AccountId,
    /// DID of the subject identity.
    pub subject_did: Did,
    /// Credential types beyond the base `VerifiableCredential`.
    pub credential_type: Vec<String>,
    /// Claims about the subject.
    pub credential_subject: Map<String, Value>,
    /// Optional expiry instant.
    pub expiration_date: Option<Timestamp>,
    /// Optional issuer-signed proof over the envelope.
    pub proof: Option<Proof>,
}

/// Check a W3C credential's integrity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgVerifyCredential {
    /// The credential to check.
    pub credential_id: CredentialId,
    /// Signing account of the verifier, recorded in the audit trail.
    pub verifier: AccountId,
}

/// Revoke a W3C credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgRevokeCredential {
    /// The credential to revoke.
    pub credential_id: CredentialId,
    /// Signing account; must match the recorded issuer.
    pub revoker: AccountId,
    /// Revocation reason, recorded on the status slot.
    pub reason: String,
}

/// Issue a zero-knowledge credential bound to a circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgIssueZkCredential {
    /// DID of the holder; doubles as the signing principal.
    pub holder: Did,
    /// The circuit to bind against.
    pub circuit_id: String,
    /// Public inputs the proof commits to.
    pub public_inputs: Map<String, Value>,
    /// The proof blob.
    pub zk_proof: ZkProof,
    /// Privacy parameters.
    pub privacy: PrivacyParameters,
}

/// Re-verify a stored ZK credential's proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgVerifyZkProof {
    /// The ZK credential to check.
    pub zk_credential_id: ZkCredentialId,
    /// Signing account of the verifier, recorded in the audit trail.
    pub verifier: AccountId,
}

/// Merge a typed compliance payload into an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgUpdateCompliance {
    /// The identity to update.
    pub identity_id: IdentityId,
    /// Signing account of the auditor.
    pub auditor: AccountId,
    /// The framework payload.
    pub update: ComplianceUpdate,
}

/// Run a compliance audit over an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgPerformAudit {
    /// The identity to audit.
    pub identity_id: IdentityId,
    /// Which scoring rules to run.
    pub audit_type: AuditType,
    /// Signing account of the auditor.
    pub auditor: AccountId,
}

/// Grant a capability permission on an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgGrantPermission {
    /// The identity the grant is scoped to.
    pub identity_id: IdentityId,
    /// The resource the capability covers.
    pub resource: String,
    /// The action the capability covers.
    pub action: String,
    /// The account receiving the capability.
    pub grantee: AccountId,
    /// Signing account of the grantor.
    pub grantor: AccountId,
    /// Optional lapse instant.
    pub expires_at: Option<Timestamp>,
}

/// Remove a permission grant by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsgRevokePermission {
    /// The identity the grant is scoped to.
    pub identity_id: IdentityId,
    /// The grant to remove.
    pub permission_id: PermissionId,
    /// Signing account of the revoker.
    pub revoker: AccountId,
}

/// Every command the dispatcher accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    /// Issue a ledger credential.
    IssueVc(MsgIssueVc),
    /// Revoke a ledger credential.
    RevokeVc(MsgRevokeVc),
    /// Create a universal identity.
    CreateIdentity(MsgCreateIdentity),
    /// Partially update an identity.
    UpdateIdentity(MsgUpdateIdentity),
    /// Add a protocol sub-identity.
    AddProtocolIdentity(MsgAddProtocolIdentity),
    /// Issue a W3C credential.
    IssueCredential(MsgIssueCredential),
    /// Verify a W3C credential.
    VerifyCredential(MsgVerifyCredential),
    /// Revoke a W3C credential.
    RevokeCredential(MsgRevokeCredential),
    /// Issue a ZK credential.
    IssueZkCredential(MsgIssueZkCredential),
    /// Verify a ZK credential's proof.
    VerifyZkProof(MsgVerifyZkProof),
    /// Merge compliance data.
    UpdateCompliance(MsgUpdateCompliance),
    /// Run a compliance audit.
    PerformAudit(MsgPerformAudit),
    /// Grant a permission.
    GrantPermission(MsgGrantPermission),
    /// Revoke a permission.
    RevokePermission(MsgRevokePermission),
}

impl Msg {
    /// Command type name, used for routing logs and event kinds.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IssueVc(_) => "issue_vc",
            Self::RevokeVc(_) => "revoke_vc",
            Self::CreateIdentity(_) => "create_identity",
            Self::UpdateIdentity(_) => "update_identity",
            Self::AddProtocolIdentity(_) => "add_protocol_identity",
            Self::IssueCredential(_) => "issue_credential",
            Self::VerifyCredential(_) => "verify_credential",
            Self::RevokeCredential(_) => "revoke_credential",
            Self::IssueZkCredential(_) => "issue_zk_credential",
            Self::VerifyZkProof(_) => "verify_zk_proof",
            Self::UpdateCompliance(_) => "update_compliance",
            Self::PerformAudit(_) => "perform_audit",
            Self::GrantPermission(_) => "grant_permission",
            Self::RevokePermission(_) => "revoke_permission",
        }
    }

    /// The principal whose signature the host must have verified before
    /// delivering this command.
    pub fn signer(&self) -> &str {
        match self {
            Self::IssueVc(msg) => msg.issuer.as_str(),
            Self::RevokeVc(msg) => msg.creator.as_str(),
            Self::CreateIdentity(msg) => msg.creator.as_str(),
            Self::UpdateIdentity(msg) => msg.updater.as_str(),
            Self::AddProtocolIdentity(msg) => msg.requestor.as_str(),
            Self::IssueCredential(msg) => msg.issuer.as_str(),
            Self::VerifyCredential(msg) => msg.verifier.as_str(),
            Self::RevokeCredential(msg) => msg.revoker.as_str(),
            Self::IssueZkCredential(msg) => msg.holder.as_str(),
            Self::VerifyZkProof(msg) => msg.verifier.as_str(),
            Self::UpdateCompliance(msg) => msg.auditor.as_str(),
            Self::PerformAudit(msg) => msg.auditor.as_str(),
            Self::GrantPermission(msg) => msg.grantor.as_str(),
            Self::RevokePermission(msg) => msg.revoker.as_str(),
        }
    }

    /// Stateless well-formedness validation, run before any component is
    /// touched.
    pub fn validate_basic(&self) -> Result<(), LedgerError> {
        match self {
            Self::IssueVc(msg) => {
                require("credential id", msg.id.as_str())?;
                require("credential schema", &msg.credential_schema)?;
                require("credential data", &msg.credential_data)?;
                require("proof", &msg.proof)
            }
            Self::RevokeVc(msg) => require("credential id", msg.credential_id.as_str()),
            Self::CreateIdentity(msg) => {
                msg.initial_protocols.iter().try_for_each(|p| p.validate())
            }
            Self::UpdateIdentity(msg) => require("identity id", msg.identity_id.as_str()),
            Self::AddProtocolIdentity(msg) => {
                require("identity id", msg.identity_id.as_str())?;
                msg.entry.validate()
            }
            Self::IssueCredential(_) => Ok(()),
            Self::VerifyCredential(msg) => {
                require("credential id", msg.credential_id.as_str())
            }
            Self::RevokeCredential(msg) => {
                require("credential id", msg.credential_id.as_str())
            }
            Self::IssueZkCredential(msg) => {
                require("circuit id", &msg.circuit_id)?;
                if msg.zk_proof.protocol.is_empty() || msg.zk_proof.proof_data.is_empty() {
                    return Err(LedgerError::invalid_request("malformed proof structure"));
                }
                Ok(())
            }
            Self::VerifyZkProof(msg) => {
                require("zk credential id", msg.zk_credential_id.as_str())
            }
            Self::UpdateCompliance(msg) => require("identity id", msg.identity_id.as_str()),
            Self::PerformAudit(msg) => require("identity id", msg.identity_id.as_str()),
            Self::GrantPermission(msg) => {
                require("identity id", msg.identity_id.as_str())?;
                require("resource", &msg.resource)?;
                require("action", &msg.action)
            }
            Self::RevokePermission(msg) => {
                require("identity id", msg.identity_id.as_str())?;
                require("permission id", msg.permission_id.as_str())
            }
        }
    }
}

fn require(name: &str, value: &str) -> Result<(), LedgerError> {
    if value.is_empty() {
        return Err(LedgerError::invalid_request(format!(
            "{name} cannot be empty"
        )));
    }
    Ok(())
}

/// Typed response for each successful command.
#[derive(Debug, Clone)]
pub enum MsgResponse {
    /// Response to [`MsgIssueVc`].
    IssueVc {
        /// The issued credential id.
        id: CredentialId,
        /// Issuance instant.
        issued_at: Timestamp,
    },
    /// Response to [`MsgRevokeVc`].
    RevokeVc {
        /// The revoked credential id.
        id: CredentialId,
        /// Revocation instant.
        revoked_at: Timestamp,
    },
    /// Response to [`MsgCreateIdentity`].
    CreateIdentity {
        /// The minted identity id.
        identity_id: IdentityId,
        /// The minted DID.
        did: Did,
        /// Creation instant.
        created_at: Timestamp,
    },
    /// Response to [`MsgUpdateIdentity`].
    UpdateIdentity {
        /// The updated identity.
        identity_id: IdentityId,
        /// Update instant.
        updated_at: Timestamp,
    },
    /// Response to [`MsgAddProtocolIdentity`].
    AddProtocolIdentity {
        /// The extended identity.
        identity_id: IdentityId,
        /// The protocol that was added.
        protocol: ProtocolType,
    },
    /// Response to [`MsgIssueCredential`].
    IssueCredential {
        /// The minted credential id.
        credential_id: CredentialId,
        /// Full credential types.
        credential_types: Vec<String>,
        /// Issuance instant.
        issued_at: Timestamp,
        /// Expiry instant, if set.
        expires_at: Option<Timestamp>,
    },
    /// Response to [`MsgVerifyCredential`].
    VerifyCredential {
        /// The verification outcome.
        verification: CredentialVerification,
        /// When the check ran.
        verified_at: Timestamp,
    },
    /// Response to [`MsgRevokeCredential`].
    RevokeCredential {
        /// The revoked credential id.
        credential_id: CredentialId,
        /// Revocation instant.
        revoked_at: Timestamp,
    },
    /// Response to [`MsgIssueZkCredential`].
    IssueZkCredential {
        /// The minted ZK credential id.
        zk_credential_id: ZkCredentialId,
        /// The bound circuit.
        circuit_id: String,
        /// Issuance instant.
        issued_at: Timestamp,
        /// Declared privacy level.
        privacy_level: PrivacyLevel,
    },
    /// Response to [`MsgVerifyZkProof`].
    VerifyZkProof {
        /// The verification outcome.
        verification: ZkVerification,
        /// When the check ran.
        verified_at: Timestamp,
    },
    /// Response to [`MsgUpdateCompliance`].
    UpdateCompliance {
        /// The updated identity.
        identity_id: IdentityId,
        /// The framework that was updated.
        compliance_type: &'static str,
        /// Update instant.
        updated_at: Timestamp,
    },
    /// Response to [`MsgPerformAudit`].
    PerformAudit {
        /// The audited identity.
        identity_id: IdentityId,
        /// The appended audit result.
        audit: AuditResult,
    },
    /// Response to [`MsgGrantPermission`].
    GrantPermission {
        /// The identity the grant is scoped to.
        identity_id: IdentityId,
        /// The appended grant.
        permission: Permission,
    },
    /// Response to [`MsgRevokePermission`].
    RevokePermission {
        /// The identity the grant was scoped to.
        identity_id: IdentityId,
        /// The removed grant id.
        permission_id: PermissionId,
        /// Removal instant.
        revoked_at: Timestamp,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::parse(s).unwrap()
    }

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    fn issue_vc() -> MsgIssueVc {
        MsgIssueVc {
            issuer: account("issuer-1"),
            id: CredentialId::new("vc-1"),
            issuer_did: did("did:attest:a"),
            subject_did: did("did:attest:b"),
            credential_schema: "schema".into(),
            credential_data: "{}".into(),
            proof: "sig".into(),
            expires_at: Timestamp::parse("2026-01-15T13:00:00Z").unwrap(),
        }
    }

    #[test]
    fn issue_vc_requires_all_fields() {
        assert!(Msg::IssueVc(issue_vc()).validate_basic().is_ok());

        let mut msg = issue_vc();
        msg.id = CredentialId::new("");
        assert!(Msg::IssueVc(msg).validate_basic().is_err());

        let mut msg = issue_vc();
        msg.credential_schema = String::new();
        assert!(Msg::IssueVc(msg).validate_basic().is_err());

        let mut msg = issue_vc();
        msg.proof = String::new();
        assert!(Msg::IssueVc(msg).validate_basic().is_err());
    }

    #[test]
    fn zk_issue_requires_proof_structure() {
        let mut proof = attest_zkp::ZkProof {
            protocol: "mock-sha256".into(),
            proof_data: "aa".into(),
            public_signals: vec![],
            metadata: Map::new(),
        };
        let msg = |p: ZkProof| {
            Msg::IssueZkCredential(MsgIssueZkCredential {
                holder: did("did:attest:h"),
                circuit_id: "c".into(),
                public_inputs: Map::new(),
                zk_proof: p,
                privacy: PrivacyParameters {
                    nullifier_seed: "s".into(),
                    commitment_scheme: "pedersen".into(),
                    anonymity_set: vec![],
                    privacy_level: PrivacyLevel::Basic,
                },
            })
        };
        assert!(msg(proof.clone()).validate_basic().is_ok());

        proof.proof_data = String::new();
        let err = msg(proof).validate_basic().unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn signer_names_the_right_principal() {
        assert_eq!(Msg::IssueVc(issue_vc()).signer(), "issuer-1");
        assert_eq!(
            Msg::RevokeVc(MsgRevokeVc {
                creator: account("revoker-1"),
                credential_id: CredentialId::new("vc-1"),
            })
            .signer(),
            "revoker-1"
        );
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(Msg::IssueVc(issue_vc()).kind(), "issue_vc");
        assert_eq!(
            Msg::PerformAudit(MsgPerformAudit {
                identity_id: IdentityId::new("identity-1-1"),
                audit_type: AuditType::Gdpr,
                auditor: account("a"),
            })
            .kind(),
            "perform_audit"
        );
    }
}
