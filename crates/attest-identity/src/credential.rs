//! # W3C Credential Path
//!
//! Credentials in the W3C envelope, issued about registered subject
//! identities. Issuance resolves the subject through the DID → identity
//! index and links the credential id back onto the identity; verification
//! reports an outcome (never an error for an invalid credential) and leaves
//! an audit-trail entry either way; revocation is issuer-only.
//!
//! Integrity checks run in a fixed order: expiration, revocation,
//! cryptographic proof, issuer. The first failed check is the reported
//! reason.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use attest_core::{
    AccountId, BlockContext, CanonicalBytes, CredentialId, Did, LedgerError, Timestamp,
};
use attest_store::{get_json, next_sequence, put_json};
use attest_vc::Proof;

use crate::keys::{CREDENTIALS, CREDENTIAL_SEQUENCE_KEY};
use crate::registry::IdentityRegistry;

/// Context URIs stamped onto every issued credential.
const CREDENTIAL_CONTEXT: [&str; 2] = [
    "https://www.w3.org/2018/credentials/v1",
    "https://attest-ledger.org/credentials/v1",
];

/// A credential in the W3C envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Credential types, always led by `VerifiableCredential`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Credential URI.
    pub id: String,
    /// The issuing principal — an account address or a DID string.
    pub issuer: String,
    /// Issuance instant (block time).
    #[serde(rename = "issuanceDate")]
    pub issuance_date: Timestamp,
    /// Optional expiry instant.
    #[serde(rename = "expirationDate")]
    pub expiration_date: Option<Timestamp>,
    /// The claims made about the subject.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Map<String, Value>,
    /// Optional cryptographic proof supplied by the issuer.
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Canonical bytes a proof over this credential must cover: the
    /// envelope minus the proof itself.
    pub fn signing_payload(&self) -> Result<CanonicalBytes, LedgerError> {
        let body = serde_json::json!({
            "@context": self.context,
            "type": self.types,
            "id": self.id,
            "issuer": self.issuer,
            "issuanceDate": self.issuance_date,
            "expirationDate": self.expiration_date,
            "credentialSubject": self.credential_subject,
        });
        Ok(CanonicalBytes::new(&body)?)
    }
}

/// The stored form: envelope plus the revocation status slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Bare credential id (the store key; the envelope carries the URI).
    pub id: CredentialId,
    /// DID of the subject identity.
    pub subject_did: Did,
    /// The credential envelope.
    pub credential: VerifiableCredential,
    /// Whether the credential has been revoked (one-way).
    pub revoked: bool,
    /// Revocation instant.
    pub revoked_at: Option<Timestamp>,
    /// Issuer-supplied revocation reason.
    pub revocation_reason: Option<String>,
}

/// Outcome of a credential verification attempt. Data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialVerification {
    /// The credential that was checked.
    pub credential_id: CredentialId,
    /// Whether every integrity check passed.
    pub is_valid: bool,
    /// The first failed check, or `credential is valid`.
    pub reason: String,
}

impl IdentityRegistry {
    /// Issue a credential about a registered subject identity.
    ///
    /// The subject DID must resolve through the DID → identity index; the
    /// minted credential id is linked back onto the subject identity.
    pub fn issue_credential(
        &mut self,
        ctx: &BlockContext,
        issuer: &AccountId,
        subject_did: &Did,
        credential_type: Vec<String>,
        credential_subject: Map<String, Value>,
        expiration_date: Option<Timestamp>,
        proof: Option<Proof>,
    ) -> Result<StoredCredential, LedgerError> {
        let mut subject = self
            .get_by_did(subject_did)?
            .ok_or_else(|| LedgerError::not_found("identity for DID", subject_did.as_str()))?;

        let seq = next_sequence(&mut self.store, CREDENTIAL_SEQUENCE_KEY);
        let id = CredentialId::new(format!("cred-{}-{}", ctx.height, seq));

        let mut types = vec!["VerifiableCredential".to_string()];
        types.extend(credential_type);
        let credential = VerifiableCredential {
            context: CREDENTIAL_CONTEXT.iter().map(|s| s.to_string()).collect(),
            types,
            id: format!("https://attest-ledger.org/credentials/{id}"),
            issuer: issuer.as_str().to_string(),
            issuance_date: ctx.now,
            expiration_date,
            credential_subject,
            proof,
        };
        let stored = StoredCredential {
            id: id.clone(),
            subject_did: subject_did.clone(),
            credential,
            revoked: false,
            revoked_at: None,
            revocation_reason: None,
        };
        put_json(&mut self.store, CREDENTIALS.record_key(id.as_str()), &stored)?;

        subject.credential_refs.push(id.clone());
        subject.updated_at = ctx.now;
        self.write_identity(&subject)?;

        let mut changes = Map::new();
        changes.insert("credential_id".into(), Value::from(id.as_str()));
        changes.insert("subject_did".into(), Value::from(subject_did.as_str()));
        self.record_audit_entry(
            ctx,
            subject.id.as_str(),
            "ISSUE_CREDENTIAL",
            issuer,
            "success",
            changes,
        )?;

        info!(
            credential_id = %id,
            issuer = %issuer,
            subject_did = %subject_did,
            "credential issued"
        );
        Ok(stored)
    }

    /// Check a credential's integrity and report the outcome.
    ///
    /// An invalid credential is a legitimate result, not an error; the
    /// attempt is recorded in the audit trail regardless of outcome.
    pub fn verify_credential(
        &mut self,
        ctx: &BlockContext,
        credential_id: &CredentialId,
        verifier: &AccountId,
    ) -> Result<CredentialVerification, LedgerError> {
        let stored = self
            .get_credential(credential_id)?
            .ok_or_else(|| LedgerError::not_found("credential", credential_id.as_str()))?;

        let (is_valid, reason) = match self.check_integrity(ctx, &stored) {
            Ok(()) => (true, "credential is valid".to_string()),
            Err(reason) => (false, reason),
        };

        let mut changes = Map::new();
        changes.insert("verifier".into(), Value::from(verifier.as_str()));
        changes.insert("reason".into(), Value::from(reason.clone()));
        self.record_audit_entry(
            ctx,
            credential_id.as_str(),
            "VERIFY_CREDENTIAL",
            verifier,
            if is_valid { "success" } else { "failed" },
            changes,
        )?;

        Ok(CredentialVerification {
            credential_id: credential_id.clone(),
            is_valid,
            reason,
        })
    }

    /// Revoke a credential. Issuer-only, one-way.
    pub fn revoke_credential(
        &mut self,
        ctx: &BlockContext,
        credential_id: &CredentialId,
        revoker: &AccountId,
        reason: String,
    ) -> Result<(), LedgerError> {
        let mut stored = self
            .get_credential(credential_id)?
            .ok_or_else(|| LedgerError::not_found("credential", credential_id.as_str()))?;

        if stored.credential.issuer != revoker.as_str() {
            return Err(LedgerError::unauthorized(
                "only the issuer can revoke a credential",
            ));
        }
        if stored.revoked {
            return Err(LedgerError::invalid_request(
                "credential is already revoked",
            ));
        }

        stored.revoked = true;
        stored.revoked_at = Some(ctx.now);
        stored.revocation_reason = Some(reason.clone());
        put_json(
            &mut self.store,
            CREDENTIALS.record_key(credential_id.as_str()),
            &stored,
        )?;

        let mut changes = Map::new();
        changes.insert("reason".into(), Value::from(reason));
        self.record_audit_entry(
            ctx,
            credential_id.as_str(),
            "REVOKE_CREDENTIAL",
            revoker,
            "success",
            changes,
        )?;

        info!(credential_id = %credential_id, revoker = %revoker, "credential revoked");
        Ok(())
    }

    /// Point lookup by credential id.
    pub fn get_credential(
        &self,
        id: &CredentialId,
    ) -> Result<Option<StoredCredential>, LedgerError> {
        get_json(&self.store, &CREDENTIALS.record_key(id.as_str()))
    }

    /// Integrity pipeline; the error string is the first failed check.
    fn check_integrity(
        &self,
        ctx: &BlockContext,
        stored: &StoredCredential,
    ) -> Result<(), String> {
        // Expiry is checked before revocation: the first observed terminal
        // reason wins when both apply.
        if let Some(expiration) = stored.credential.expiration_date {
            if expiration <= ctx.now {
                return Err("credential has expired".to_string());
            }
        }
        if stored.revoked {
            return Err("credential has been revoked".to_string());
        }
        if let Some(proof) = &stored.credential.proof {
            let payload = stored
                .credential
                .signing_payload()
                .map_err(|e| e.to_string())?;
            proof
                .verify(&payload, self.oracle.as_ref())
                .map_err(|e| format!("cryptographic proof verification failed: {e}"))?;
        }
        if stored.credential.issuer.starts_with("did:") {
            let issuer_did =
                Did::parse(stored.credential.issuer.clone()).map_err(|e| e.to_string())?;
            match self.oracle.lookup(&issuer_did) {
                Some(record) if record.active => {}
                _ => return Err("issuer verification failed".to_string()),
            }
        }
        Ok(())
    }
}
