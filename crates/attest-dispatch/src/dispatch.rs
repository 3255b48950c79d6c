//! # The Dispatcher
//!
//! Routes each validated command to its owning component and assembles the
//! typed response plus events. Exactly one component's store is mutated per
//! command; the DID oracle and cross-component lookups are read-only.
//!
//! Verification commands (`verify_credential`, `verify_zk_proof`) are the
//! deliberate special case: their only mutation is the audit-trail entry
//! recording the attempt, and they emit no event — a failed verification is
//! a result, not an error, and not a state change worth indexing.

use tracing::debug;

use attest_core::{BlockContext, Event, LedgerError};
use attest_identity::IdentityRegistry;
use attest_vc::{CredentialLedger, VcIssuance};
use attest_zkp::{ZkIssuance, ZkSubsystem};

use crate::msg::{Msg, MsgResponse};

/// The result of one successfully dispatched command.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The typed response.
    pub response: MsgResponse,
    /// Structured events for external indexers. Empty for verification
    /// commands.
    pub events: Vec<Event>,
}

/// The single entry point routing commands to the owning components.
pub struct Dispatcher {
    registry: IdentityRegistry,
    ledger: CredentialLedger,
    zk: ZkSubsystem,
}

impl Dispatcher {
    /// Assemble a dispatcher from its components.
    pub fn new(registry: IdentityRegistry, ledger: CredentialLedger, zk: ZkSubsystem) -> Self {
        Self {
            registry,
            ledger,
            zk,
        }
    }

    /// Read access to the identity registry.
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Read access to the credential ledger.
    pub fn ledger(&self) -> &CredentialLedger {
        &self.ledger
    }

    /// Read access to the ZK subsystem.
    pub fn zk(&self) -> &ZkSubsystem {
        &self.zk
    }

    /// Validate and apply one command.
    ///
    /// On error no state has changed; on success the response and events
    /// describe exactly what was applied.
    pub fn dispatch(
        &mut self,
        ctx: &BlockContext,
        msg: Msg,
    ) -> Result<DispatchOutcome, LedgerError> {
        debug!(command = msg.kind(), signer = msg.signer(), "dispatching command");
        msg.validate_basic()?;

        match msg {
            Msg::IssueVc(msg) => {
                let record = self.ledger.issue(
                    ctx,
                    VcIssuance {
                        id: msg.id,
                        issuer: msg.issuer.clone(),
                        issuer_did: msg.issuer_did,
                        subject_did: msg.subject_did,
                        credential_schema: msg.credential_schema,
                        credential_data: msg.credential_data,
                        proof: msg.proof,
                        expires_at: msg.expires_at,
                    },
                )?;
                let event = Event::new("issue_vc")
                    .attr("issuer", &msg.issuer)
                    .attr("id", &record.id)
                    .attr("issuer_did", &record.issuer_did)
                    .attr("subject_did", &record.subject_did);
                Ok(DispatchOutcome {
                    response: MsgResponse::IssueVc {
                        id: record.id,
                        issued_at: record.issued_at,
                    },
                    events: vec![event],
                })
            }

            Msg::RevokeVc(msg) => {
                let record = self.ledger.revoke(ctx, &msg.creator, &msg.credential_id)?;
                let event = Event::new("revoke_vc")
                    .attr("issuer", &msg.creator)
                    .attr("id", &record.id);
                Ok(DispatchOutcome {
                    response: MsgResponse::RevokeVc {
                        id: record.id,
                        // Set on this command's path, never absent here.
                        revoked_at: record.revoked_at.unwrap_or(ctx.now),
                    },
                    events: vec![event],
                })
            }

            Msg::CreateIdentity(msg) => {
                let identity = self.registry.create_identity(
                    ctx,
                    &msg.creator,
                    msg.initial_protocols,
                    msg.security_level,
                )?;
                let event = Event::new("identity_created")
                    .attr("identity_id", &identity.id)
                    .attr("did", &identity.did)
                    .attr("creator", &msg.creator)
                    .attr("protocols", identity.protocols.len());
                Ok(DispatchOutcome {
                    response: MsgResponse::CreateIdentity {
                        identity_id: identity.id,
                        did: identity.did,
                        created_at: identity.created_at,
                    },
                    events: vec![event],
                })
            }

            Msg::UpdateIdentity(msg) => {
                let identity = self.registry.update_identity(
                    ctx,
                    &msg.identity_id,
                    &msg.updater,
                    msg.updates,
                )?;
                let event = Event::new("identity_updated")
                    .attr("identity_id", &identity.id)
                    .attr("updater", &msg.updater);
                Ok(DispatchOutcome {
                    response: MsgResponse::UpdateIdentity {
                        identity_id: identity.id,
                        updated_at: identity.updated_at,
                    },
                    events: vec![event],
                })
            }

            Msg::AddProtocolIdentity(msg) => {
                let protocol = msg.entry.protocol;
                let identity = self.registry.add_protocol_identity(
                    ctx,
                    &msg.identity_id,
                    msg.entry,
                    &msg.requestor,
                )?;
                let event = Event::new("protocol_identity_added")
                    .attr("identity_id", &identity.id)
                    .attr("protocol", protocol)
                    .attr("requestor", &msg.requestor);
                Ok(DispatchOutcome {
                    response: MsgResponse::AddProtocolIdentity {
                        identity_id: identity.id,
                        protocol,
                    },
                    events: vec![event],
                })
            }

            Msg::IssueCredential(msg) => {
                let stored = self.registry.issue_credential(
                    ctx,
                    &msg.issuer,
                    &msg.subject_did,
                    msg.credential_type,
                    msg.credential_subject,
                    msg.expiration_date,
                    msg.proof,
                )?;
                let event = Event::new("credential_issued")
                    .attr("credential_id", &stored.id)
                    .attr("issuer", &msg.issuer)
                    .attr("subject_did", &stored.subject_did)
                    .attr("credential_type", stored.credential.types.join(","));
                Ok(DispatchOutcome {
                    response: MsgResponse::IssueCredential {
                        credential_id: stored.id,
                        credential_types: stored.credential.types,
                        issued_at: stored.credential.issuance_date,
                        expires_at: stored.credential.expiration_date,
                    },
                    events: vec![event],
                })
            }

            Msg::VerifyCredential(msg) => {
                let verification =
                    self.registry
                        .verify_credential(ctx, &msg.credential_id, &msg.verifier)?;
                Ok(DispatchOutcome {
                    response: MsgResponse::VerifyCredential {
                        verification,
                        verified_at: ctx.now,
                    },
                    events: vec![],
                })
            }

            Msg::RevokeCredential(msg) => {
                self.registry.revoke_credential(
                    ctx,
                    &msg.credential_id,
                    &msg.revoker,
                    msg.reason,
                )?;
                let event = Event::new("credential_revoked")
                    .attr("credential_id", &msg.credential_id)
                    .attr("revoker", &msg.revoker);
                Ok(DispatchOutcome {
                    response: MsgResponse::RevokeCredential {
                        credential_id: msg.credential_id,
                        revoked_at: ctx.now,
                    },
                    events: vec![event],
                })
            }

            Msg::IssueZkCredential(msg) => {
                // Holder existence is a read-only registry check; the ZK
                // store is the single mutation of this command.
                self.registry.get_by_did(&msg.holder)?.ok_or_else(|| {
                    LedgerError::not_found("identity for DID", msg.holder.as_str())
                })?;
                let credential = self.zk.issue(
                    ctx,
                    ZkIssuance {
                        holder_did: msg.holder,
                        circuit_id: msg.circuit_id,
                        public_inputs: msg.public_inputs,
                        proof: msg.zk_proof,
                        privacy: msg.privacy,
                    },
                )?;
                let event = Event::new("zk_credential_issued")
                    .attr("zk_credential_id", &credential.id)
                    .attr("holder", &credential.holder_did)
                    .attr("circuit_id", &credential.circuit_id)
                    .attr("privacy_level", credential.privacy.privacy_level.as_str());
                Ok(DispatchOutcome {
                    response: MsgResponse::IssueZkCredential {
                        zk_credential_id: credential.id,
                        circuit_id: credential.circuit_id,
                        issued_at: credential.created_at,
                        privacy_level: credential.privacy.privacy_level,
                    },
                    events: vec![event],
                })
            }

            Msg::VerifyZkProof(msg) => {
                let verification = self.zk.verify(&msg.zk_credential_id)?;

                // The attempt is recorded regardless of outcome; this audit
                // append is the command's single mutation.
                let mut changes = serde_json::Map::new();
                changes.insert(
                    "verifier".into(),
                    serde_json::Value::from(msg.verifier.as_str()),
                );
                changes.insert(
                    "circuit_id".into(),
                    serde_json::Value::from(verification.circuit_id.clone()),
                );
                self.registry.record_audit_entry(
                    ctx,
                    msg.zk_credential_id.as_str(),
                    "VERIFY_ZK_PROOF",
                    &msg.verifier,
                    if verification.is_valid {
                        "success"
                    } else {
                        "failed"
                    },
                    changes,
                )?;

                Ok(DispatchOutcome {
                    response: MsgResponse::VerifyZkProof {
                        verification,
                        verified_at: ctx.now,
                    },
                    events: vec![],
                })
            }

            Msg::UpdateCompliance(msg) => {
                let compliance_type = msg.update.framework();
                self.registry
                    .update_compliance(ctx, &msg.identity_id, msg.update, &msg.auditor)?;
                let event = Event::new("compliance_updated")
                    .attr("identity_id", &msg.identity_id)
                    .attr("compliance_type", compliance_type)
                    .attr("auditor", &msg.auditor);
                Ok(DispatchOutcome {
                    response: MsgResponse::UpdateCompliance {
                        identity_id: msg.identity_id,
                        compliance_type,
                        updated_at: ctx.now,
                    },
                    events: vec![event],
                })
            }

            Msg::PerformAudit(msg) => {
                let audit = self.registry.perform_audit(
                    ctx,
                    &msg.identity_id,
                    msg.audit_type,
                    &msg.auditor,
                )?;
                let event = Event::new("audit_performed")
                    .attr("identity_id", &msg.identity_id)
                    .attr("audit_id", &audit.audit_id)
                    .attr("audit_type", audit.audit_type)
                    .attr("score", audit.score);
                Ok(DispatchOutcome {
                    response: MsgResponse::PerformAudit {
                        identity_id: msg.identity_id,
                        audit,
                    },
                    events: vec![event],
                })
            }

            Msg::GrantPermission(msg) => {
                let permission = self.registry.grant_permission(
                    ctx,
                    &msg.identity_id,
                    msg.resource,
                    msg.action,
                    msg.grantee,
                    &msg.grantor,
                    msg.expires_at,
                )?;
                let event = Event::new("permission_granted")
                    .attr("identity_id", &msg.identity_id)
                    .attr("permission_id", &permission.id)
                    .attr("resource", &permission.resource)
                    .attr("action", &permission.action)
                    .attr("grantee", &permission.grantee);
                Ok(DispatchOutcome {
                    response: MsgResponse::GrantPermission {
                        identity_id: msg.identity_id,
                        permission,
                    },
                    events: vec![event],
                })
            }

            Msg::RevokePermission(msg) => {
                self.registry.revoke_permission(
                    ctx,
                    &msg.identity_id,
                    &msg.permission_id,
                    &msg.revoker,
                )?;
                let event = Event::new("permission_revoked")
                    .attr("identity_id", &msg.identity_id)
                    .attr("permission_id", &msg.permission_id);
                Ok(DispatchOutcome {
                    response: MsgResponse::RevokePermission {
                        identity_id: msg.identity_id,
                        permission_id: msg.permission_id,
                        revoked_at: ctx.now,
                    },
                    events: vec![event],
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::{MsgCreateIdentity, MsgIssueVc, MsgIssueZkCredential};
    use attest_core::{AccountId, CredentialId, Did, MemoryDidOracle, Timestamp};
    use attest_identity::SecurityLevel;
    use attest_store::MemoryKvStore;
    use attest_zkp::{
        MockProofVerifier, PrivacyLevel, PrivacyParameters, ProofBackendPolicy,
    };
    use std::sync::Arc;

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    fn account(s: &str) -> AccountId {
        AccountId::parse(s).unwrap()
    }

    fn ctx() -> BlockContext {
        BlockContext::new(7, Timestamp::parse("2026-01-15T12:00:00Z").unwrap())
    }

    fn dispatcher() -> Dispatcher {
        let mut oracle = MemoryDidOracle::new();
        oracle.register(did("did:attest:a"), vec![]);
        oracle.register(did("did:attest:b"), vec![]);
        let oracle = Arc::new(oracle);
        Dispatcher::new(
            IdentityRegistry::new(MemoryKvStore::new(), oracle.clone()),
            CredentialLedger::new(MemoryKvStore::new(), oracle),
            ZkSubsystem::new(
                MemoryKvStore::new(),
                Box::new(MockProofVerifier),
                ProofBackendPolicy::development(),
            ),
        )
    }

    fn issue_vc_msg(id: &str) -> Msg {
        Msg::IssueVc(MsgIssueVc {
            issuer: account("issuer-1"),
            id: CredentialId::new(id),
            issuer_did: did("did:attest:a"),
            subject_did: did("did:attest:b"),
            credential_schema: "schema".into(),
            credential_data: "{}".into(),
            proof: "sig".into(),
            expires_at: Timestamp::parse("2026-01-15T13:00:00Z").unwrap(),
        })
    }

    #[test]
    fn validation_runs_before_routing() {
        let mut dispatcher = dispatcher();
        let msg = Msg::IssueVc(MsgIssueVc {
            issuer: account("issuer-1"),
            id: CredentialId::new(""),
            issuer_did: did("did:attest:a"),
            subject_did: did("did:attest:b"),
            credential_schema: "schema".into(),
            credential_data: "{}".into(),
            proof: "sig".into(),
            expires_at: Timestamp::parse("2026-01-15T13:00:00Z").unwrap(),
        });
        let err = dispatcher.dispatch(&ctx(), msg).unwrap_err();
        assert_eq!(err.code(), "invalid_request");
        assert!(dispatcher.ledger().all_records().unwrap().is_empty());
    }

    #[test]
    fn issue_vc_emits_event_with_entity_id() {
        let mut dispatcher = dispatcher();
        let outcome = dispatcher.dispatch(&ctx(), issue_vc_msg("vc-1")).unwrap();
        assert_eq!(outcome.events.len(), 1);
        let event = &outcome.events[0];
        assert_eq!(event.kind, "issue_vc");
        assert_eq!(event.get("id"), Some("vc-1"));
        assert_eq!(event.get("issuer_did"), Some("did:attest:a"));
    }

    #[test]
    fn failed_command_leaves_no_events_or_state() {
        let mut dispatcher = dispatcher();
        dispatcher.dispatch(&ctx(), issue_vc_msg("vc-1")).unwrap();
        let err = dispatcher
            .dispatch(&ctx(), issue_vc_msg("vc-1"))
            .unwrap_err();
        assert_eq!(err.code(), "already_exists");
        assert_eq!(dispatcher.ledger().all_records().unwrap().len(), 1);
    }

    #[test]
    fn zk_issue_requires_registered_holder() {
        let mut dispatcher = dispatcher();
        let inputs = serde_json::Map::new();
        let proof = MockProofVerifier::prove("circuit-1", &inputs, vec![]).unwrap();
        let msg = Msg::IssueZkCredential(MsgIssueZkCredential {
            holder: did("did:attest:nobody"),
            circuit_id: "circuit-1".into(),
            public_inputs: inputs,
            zk_proof: proof,
            privacy: PrivacyParameters {
                nullifier_seed: "seed".into(),
                commitment_scheme: "pedersen".into(),
                anonymity_set: vec![],
                privacy_level: PrivacyLevel::Basic,
            },
        });
        let err = dispatcher.dispatch(&ctx(), msg).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn create_identity_response_carries_minted_ids() {
        let mut dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch(
                &ctx(),
                Msg::CreateIdentity(MsgCreateIdentity {
                    creator: account("creator-1"),
                    initial_protocols: vec![],
                    security_level: SecurityLevel::Enhanced,
                }),
            )
            .unwrap();
        match outcome.response {
            MsgResponse::CreateIdentity {
                identity_id, did, ..
            } => {
                assert_eq!(identity_id.as_str(), "identity-7-1");
                assert_eq!(did.as_str(), "did:attest:identity-7-1");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(outcome.events[0].kind, "identity_created");
    }
}
