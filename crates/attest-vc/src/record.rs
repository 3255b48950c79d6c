//! # Credential Records
//!
//! `VcRecord` is the stored form of a plain verifiable credential. The
//! record itself only ever changes in one way after issuance: the one-way
//! revocation flip. Expiry is a *derived* state computed against block time
//! at read or verify time — it is never written back.

use serde::{Deserialize, Serialize};

use attest_core::{AccountId, CredentialId, Did, Timestamp};

/// Parameters for issuing a credential into the ledger.
///
/// The id is caller-chosen; uniqueness is enforced at issuance.
#[derive(Debug, Clone)]
pub struct VcIssuance {
    /// Caller-chosen credential id.
    pub id: CredentialId,
    /// The account signing the issuance command.
    pub issuer: AccountId,
    /// DID of the issuing party.
    pub issuer_did: Did,
    /// DID of the credential subject.
    pub subject_did: Did,
    /// Schema reference for the credential payload.
    pub credential_schema: String,
    /// Opaque credential payload.
    pub credential_data: String,
    /// Opaque issuance proof supplied by the issuer.
    pub proof: String,
    /// Expiry instant; must be strictly in the future at issuance.
    pub expires_at: Timestamp,
}

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcRecord {
    /// Globally unique credential id.
    pub id: CredentialId,
    /// Account that issued the credential; the only principal allowed to
    /// revoke it.
    pub issuer: AccountId,
    /// DID of the issuing party, active at issuance time.
    pub issuer_did: Did,
    /// DID of the credential subject, active at issuance time.
    pub subject_did: Did,
    /// Schema reference for the credential payload.
    pub credential_schema: String,
    /// Opaque credential payload.
    pub credential_data: String,
    /// Opaque issuance proof.
    pub proof: String,
    /// Whether the credential has been revoked (one-way).
    pub revoked: bool,
    /// Issuance instant (block time).
    pub issued_at: Timestamp,
    /// Expiry instant.
    pub expires_at: Timestamp,
    /// Revocation instant, set exactly once when `revoked` flips.
    pub revoked_at: Option<Timestamp>,
}

impl VcRecord {
    /// Build the record stored for a validated issuance.
    pub fn from_issuance(issuance: VcIssuance, issued_at: Timestamp) -> Self {
        Self {
            id: issuance.id,
            issuer: issuance.issuer,
            issuer_did: issuance.issuer_did,
            subject_did: issuance.subject_did,
            credential_schema: issuance.credential_schema,
            credential_data: issuance.credential_data,
            proof: issuance.proof,
            revoked: false,
            issued_at,
            expires_at: issuance.expires_at,
            revoked_at: None,
        }
    }

    /// Whether the credential has lapsed at the given block time.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// The derived credential state at the given block time.
    ///
    /// A credential can be expired and revoked at once; the reported reason
    /// is the first observed, with expiry checked before revocation.
    pub fn state(&self, now: Timestamp) -> CredentialState {
        if self.is_expired(now) {
            CredentialState::Expired
        } else if self.revoked {
            CredentialState::Revoked
        } else {
            CredentialState::Active
        }
    }
}

/// Derived lifecycle state of a credential. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialState {
    /// Not expired, not revoked.
    Active,
    /// Block time has passed `expires_at` (terminal).
    Expired,
    /// The issuer revoked the credential (terminal).
    Revoked,
}

impl std::fmt::Display for CredentialState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}
