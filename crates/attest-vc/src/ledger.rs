//! # Credential Ledger Component
//!
//! The owning component for `VcRecord` state. All validation happens before
//! the first store write, so inside the host's transaction wrapper every
//! operation is all-or-nothing.
//!
//! ## Index Discipline
//!
//! The primary record and both secondary index entries are written and
//! removed only through [`CredentialLedger::write_record`] and
//! [`CredentialLedger::delete_record`]. Revocation rewrites the record in
//! place and intentionally keeps the index entries — revocation is metadata
//! on a still-queryable credential. Range lookups dereference index entries
//! into the primary store and skip entries whose record has been physically
//! removed rather than erroring.

use std::sync::Arc;

use tracing::{debug, info};

use attest_core::{AccountId, BlockContext, CredentialId, Did, DidOracle, LedgerError};
use attest_store::{get_json, put_json, MemoryKvStore};

use crate::keys::{VC_BY_ISSUER, VC_BY_SUBJECT, VC_RECORDS};
use crate::record::{VcIssuance, VcRecord};

/// The credential ledger: primary store plus by-issuer and by-subject
/// indexes, gated by the DID oracle.
pub struct CredentialLedger {
    store: MemoryKvStore,
    oracle: Arc<dyn DidOracle>,
}

impl CredentialLedger {
    /// Create a ledger over an injected store handle and DID oracle.
    pub fn new(store: MemoryKvStore, oracle: Arc<dyn DidOracle>) -> Self {
        Self { store, oracle }
    }

    /// Issue a credential.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` — the id is already taken; the stored record is
    ///   left untouched.
    /// - `NotFound` / `InvalidRequest` — issuer or subject DID is unknown or
    ///   deactivated.
    /// - `InvalidRequest` — `expires_at` is not strictly in the future.
    pub fn issue(
        &mut self,
        ctx: &BlockContext,
        issuance: VcIssuance,
    ) -> Result<VcRecord, LedgerError> {
        if self.exists(&issuance.id) {
            return Err(LedgerError::already_exists(
                "vc record",
                issuance.id.as_str(),
            ));
        }
        self.validate_did_active(&issuance.issuer_did)?;
        self.validate_did_active(&issuance.subject_did)?;
        if issuance.expires_at <= ctx.now {
            return Err(LedgerError::invalid_request(
                "expiration date must be in the future",
            ));
        }

        let record = VcRecord::from_issuance(issuance, ctx.now);
        self.write_record(&record)?;

        info!(
            credential_id = %record.id,
            issuer_did = %record.issuer_did,
            subject_did = %record.subject_did,
            "credential issued"
        );
        Ok(record)
    }

    /// Revoke a credential. One-way; the record stays queryable and both
    /// index entries remain.
    ///
    /// # Errors
    ///
    /// - `NotFound` — no record under this id.
    /// - `InvalidRequest` — already revoked, or already expired (expiry and
    ///   revocation are distinct terminal reasons, not interchangeable).
    /// - `Unauthorized` — the caller is not the recorded issuing account.
    pub fn revoke(
        &mut self,
        ctx: &BlockContext,
        caller: &AccountId,
        id: &CredentialId,
    ) -> Result<VcRecord, LedgerError> {
        let mut record = self
            .get(id)?
            .ok_or_else(|| LedgerError::not_found("vc record", id.as_str()))?;

        if record.revoked {
            return Err(LedgerError::invalid_request(
                "credential is already revoked",
            ));
        }
        if record.is_expired(ctx.now) {
            return Err(LedgerError::invalid_request(
                "credential has already expired",
            ));
        }
        if record.issuer != *caller {
            return Err(LedgerError::unauthorized(
                "only the issuing account can revoke a credential",
            ));
        }

        record.revoked = true;
        record.revoked_at = Some(ctx.now);
        self.write_record(&record)?;

        info!(credential_id = %record.id, revoked_by = %caller, "credential revoked");
        Ok(record)
    }

    /// Physically delete a record and both index entries. Admin path; a
    /// revoked credential normally stays in the store.
    pub fn remove(&mut self, id: &CredentialId) -> Result<VcRecord, LedgerError> {
        let record = self
            .get(id)?
            .ok_or_else(|| LedgerError::not_found("vc record", id.as_str()))?;
        self.delete_record(&record);
        info!(credential_id = %record.id, "credential record removed");
        Ok(record)
    }

    /// Point lookup by credential id.
    pub fn get(&self, id: &CredentialId) -> Result<Option<VcRecord>, LedgerError> {
        get_json(&self.store, &VC_RECORDS.record_key(id.as_str()))
    }

    /// Whether a record exists under this id.
    pub fn exists(&self, id: &CredentialId) -> bool {
        self.store.contains(&VC_RECORDS.record_key(id.as_str()))
    }

    /// All credentials issued by a DID, in index order.
    pub fn records_by_issuer(&self, issuer_did: &Did) -> Result<Vec<VcRecord>, LedgerError> {
        self.scan_index(&VC_BY_ISSUER.group_prefix(issuer_did.as_str()))
    }

    /// All credentials about a subject DID, in index order.
    pub fn records_by_subject(&self, subject_did: &Did) -> Result<Vec<VcRecord>, LedgerError> {
        self.scan_index(&VC_BY_SUBJECT.group_prefix(subject_did.as_str()))
    }

    /// Every stored record, in id order. Genesis export support.
    pub fn all_records(&self) -> Result<Vec<VcRecord>, LedgerError> {
        self.store
            .prefix_scan(&VC_RECORDS.scan_prefix())
            .map(|(_, bytes)| {
                serde_json::from_slice(bytes).map_err(|e| {
                    LedgerError::invalid_request(format!("store decode failed: {e}"))
                })
            })
            .collect()
    }

    /// Reject issuance against a DID that is unknown or deactivated.
    fn validate_did_active(&self, did: &Did) -> Result<(), LedgerError> {
        let record = self
            .oracle
            .lookup(did)
            .ok_or_else(|| LedgerError::not_found("DID document", did.as_str()))?;
        if !record.active {
            return Err(LedgerError::invalid_request(format!(
                "DID document is deactivated: {did}"
            )));
        }
        Ok(())
    }

    /// Walk one index group and dereference into the primary store,
    /// skipping dangling entries.
    fn scan_index(&self, group_prefix: &[u8]) -> Result<Vec<VcRecord>, LedgerError> {
        let ids: Vec<String> = self
            .store
            .prefix_scan(group_prefix)
            .map(|(_, v)| String::from_utf8_lossy(v).into_owned())
            .collect();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get(&CredentialId::new(&id))? {
                records.push(record);
            } else {
                debug!(credential_id = %id, "skipping dangling index entry");
            }
        }
        Ok(records)
    }

    /// Write the primary record plus both index entries. The single call
    /// site that keeps record and indexes 1:1.
    fn write_record(&mut self, record: &VcRecord) -> Result<(), LedgerError> {
        put_json(
            &mut self.store,
            VC_RECORDS.record_key(record.id.as_str()),
            record,
        )?;
        self.store.set(
            VC_BY_ISSUER.index_key(record.issuer_did.as_str(), record.id.as_str()),
            record.id.as_str().as_bytes().to_vec(),
        );
        self.store.set(
            VC_BY_SUBJECT.index_key(record.subject_did.as_str(), record.id.as_str()),
            record.id.as_str().as_bytes().to_vec(),
        );
        Ok(())
    }

    /// Tear down the primary record plus both index entries.
    fn delete_record(&mut self, record: &VcRecord) {
        self.store
            .delete(&VC_RECORDS.record_key(record.id.as_str()));
        self.store
            .delete(&VC_BY_ISSUER.index_key(record.issuer_did.as_str(), record.id.as_str()));
        self.store
            .delete(&VC_BY_SUBJECT.index_key(record.subject_did.as_str(), record.id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::{MemoryDidOracle, Timestamp};

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    fn account(s: &str) -> AccountId {
        AccountId::parse(s).unwrap()
    }

    fn ctx() -> BlockContext {
        BlockContext::new(7, Timestamp::parse("2026-01-15T12:00:00Z").unwrap())
    }

    fn ledger() -> CredentialLedger {
        let mut oracle = MemoryDidOracle::new();
        oracle.register(did("did:attest:a"), vec![]);
        oracle.register(did("did:attest:b"), vec![]);
        oracle.register(did("did:attest:gone"), vec![]);
        oracle.deactivate(&did("did:attest:gone"));
        CredentialLedger::new(MemoryKvStore::new(), Arc::new(oracle))
    }

    fn issuance(id: &str) -> VcIssuance {
        VcIssuance {
            id: CredentialId::new(id),
            issuer: account("did:attest:a"),
            issuer_did: did("did:attest:a"),
            subject_did: did("did:attest:b"),
            credential_schema: "https://example.org/schemas/kyc".into(),
            credential_data: r#"{"age_over":18}"#.into(),
            proof: "sig".into(),
            expires_at: Timestamp::parse("2026-01-15T13:00:00Z").unwrap(),
        }
    }

    #[test]
    fn test_issue_and_lookup() {
        let mut ledger = ledger();
        let record = ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        assert_eq!(record.issued_at, ctx().now);
        assert!(!record.revoked);

        let fetched = ledger.get(&CredentialId::new("vc-1")).unwrap().unwrap();
        assert_eq!(fetched, record);
        assert!(ledger.exists(&CredentialId::new("vc-1")));
    }

    #[test]
    fn test_duplicate_issue_rejected_and_original_kept() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();

        let mut dup = issuance("vc-1");
        dup.credential_data = "tampered".into();
        let err = ledger.issue(&ctx(), dup).unwrap_err();
        assert_eq!(err.code(), "already_exists");

        let stored = ledger.get(&CredentialId::new("vc-1")).unwrap().unwrap();
        assert_eq!(stored.credential_data, r#"{"age_over":18}"#);
    }

    #[test]
    fn test_issue_unknown_did_rejected() {
        let mut ledger = ledger();
        let mut bad = issuance("vc-1");
        bad.subject_did = did("did:attest:nobody");
        let err = ledger.issue(&ctx(), bad).unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(!ledger.exists(&CredentialId::new("vc-1")));
    }

    #[test]
    fn test_issue_deactivated_did_rejected() {
        let mut ledger = ledger();
        let mut bad = issuance("vc-1");
        bad.issuer_did = did("did:attest:gone");
        let err = ledger.issue(&ctx(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn test_issue_past_expiry_rejected() {
        let mut ledger = ledger();
        let mut bad = issuance("vc-1");
        bad.expires_at = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let err = ledger.issue(&ctx(), bad).unwrap_err();
        assert_eq!(err.code(), "invalid_request");

        bad = issuance("vc-1");
        bad.expires_at = Timestamp::parse("2026-01-15T11:00:00Z").unwrap();
        assert!(ledger.issue(&ctx(), bad).is_err());
    }

    #[test]
    fn test_index_consistency() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        ledger.issue(&ctx(), issuance("vc-2")).unwrap();

        let by_issuer = ledger.records_by_issuer(&did("did:attest:a")).unwrap();
        assert_eq!(by_issuer.len(), 2);
        let by_subject = ledger.records_by_subject(&did("did:attest:b")).unwrap();
        assert_eq!(by_subject.len(), 2);
        assert!(ledger
            .records_by_issuer(&did("did:attest:b"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_revoke_happy_path_keeps_indexes() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();

        let revoked = ledger
            .revoke(&ctx(), &account("did:attest:a"), &CredentialId::new("vc-1"))
            .unwrap();
        assert!(revoked.revoked);
        assert_eq!(revoked.revoked_at, Some(ctx().now));

        // Revocation is metadata; the record is still indexed.
        let by_issuer = ledger.records_by_issuer(&did("did:attest:a")).unwrap();
        assert_eq!(by_issuer.len(), 1);
        assert!(by_issuer[0].revoked);
    }

    #[test]
    fn test_revoke_is_monotonic() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        let caller = account("did:attest:a");
        let id = CredentialId::new("vc-1");

        ledger.revoke(&ctx(), &caller, &id).unwrap();
        let err = ledger.revoke(&ctx(), &caller, &id).unwrap_err();
        assert_eq!(err.code(), "invalid_request");

        let stored = ledger.get(&id).unwrap().unwrap();
        assert!(stored.revoked);
        assert!(stored.revoked_at.is_some());
    }

    #[test]
    fn test_revoke_missing_is_not_found() {
        let mut ledger = ledger();
        let err = ledger
            .revoke(
                &ctx(),
                &account("did:attest:a"),
                &CredentialId::new("vc-none"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_revoke_expired_rejected() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();

        let later = BlockContext::new(9, Timestamp::parse("2026-01-15T14:00:00Z").unwrap());
        let err = ledger
            .revoke(&later, &account("did:attest:a"), &CredentialId::new("vc-1"))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_request");
        assert!(!ledger.get(&CredentialId::new("vc-1")).unwrap().unwrap().revoked);
    }

    #[test]
    fn test_revoke_by_non_issuer_unauthorized() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        let err = ledger
            .revoke(&ctx(), &account("did:attest:b"), &CredentialId::new("vc-1"))
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn test_remove_tears_down_indexes() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        ledger.remove(&CredentialId::new("vc-1")).unwrap();

        assert!(!ledger.exists(&CredentialId::new("vc-1")));
        assert!(ledger
            .records_by_issuer(&did("did:attest:a"))
            .unwrap()
            .is_empty());
        assert!(ledger
            .records_by_subject(&did("did:attest:b"))
            .unwrap()
            .is_empty());

        let err = ledger.remove(&CredentialId::new("vc-1")).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_all_records() {
        let mut ledger = ledger();
        ledger.issue(&ctx(), issuance("vc-2")).unwrap();
        ledger.issue(&ctx(), issuance("vc-1")).unwrap();
        let all = ledger.all_records().unwrap();
        assert_eq!(all.len(), 2);
        // Id order, not insertion order.
        assert_eq!(all[0].id.as_str(), "vc-1");
    }
}
