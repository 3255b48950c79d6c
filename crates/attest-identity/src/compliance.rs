//! # Typed Compliance Data
//!
//! Compliance payloads are closed, typed structures per framework — the
//! audit scoring rules operate over statically known shapes, never over
//! untyped maps. `ComplianceUpdate` is the tagged union a compliance
//! command carries; `ComplianceData` is what the identity stores.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use attest_core::{AccountId, BlockContext, IdentityId, LedgerError, Timestamp};

use crate::audit::AuditResult;
use crate::registry::IdentityRegistry;

/// GDPR posture for an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdprCompliance {
    /// Documented lawful basis for processing.
    pub lawful_basis: String,
    /// Whether user consent has been obtained and documented.
    pub consent_given: bool,
    /// Whether consent was later withdrawn.
    pub consent_withdrawn: bool,
    /// Documented purpose of data processing.
    pub data_processing_purpose: String,
    /// Whether the right to erasure is implemented.
    pub right_to_erasure: bool,
    /// Whether the right to data portability is implemented.
    pub right_to_portability: bool,
    /// When consent was recorded.
    pub consent_date: Option<Timestamp>,
}

/// CCPA posture for an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcpaCompliance {
    /// Whether the consumer has opted out of data sale.
    pub opt_out: bool,
    /// Whether data sale is prohibited for this identity.
    pub data_sale_prohibited: bool,
    /// Whether the right to delete is implemented.
    pub right_to_delete: bool,
    /// Whether the right to know is implemented.
    pub right_to_know: bool,
    /// When the opt-out was recorded.
    pub opt_out_date: Option<Timestamp>,
}

/// HIPAA posture for an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HipaaCompliance {
    /// Whether the controller is a covered entity.
    pub covered_entity: bool,
    /// Whether the controller is a business associate.
    pub business_associate: bool,
    /// Whether protected health information is processed.
    pub phi_processed: bool,
    /// Whether the Security Rule is implemented.
    pub security_rule: bool,
    /// Whether the Privacy Rule is implemented.
    pub privacy_rule: bool,
    /// Whether breach notification procedures exist.
    pub breach_notification: bool,
}

/// SOX posture for an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoxCompliance {
    /// Whether the entity is a public company.
    pub public_company: bool,
    /// Whether the identity participates in financial reporting.
    pub financial_reporting: bool,
    /// Whether internal controls are implemented.
    pub internal_controls: bool,
    /// Whether auditor independence is maintained.
    pub auditor_independence: bool,
    /// When the last certification was recorded.
    pub certification_date: Option<Timestamp>,
}

/// The typed payload a compliance update carries. Closed — there is no
/// catch-all variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "framework", content = "data", rename_all = "lowercase")]
pub enum ComplianceUpdate {
    /// Replace the GDPR posture.
    Gdpr(GdprCompliance),
    /// Replace the CCPA posture.
    Ccpa(CcpaCompliance),
    /// Replace the HIPAA posture.
    Hipaa(HipaaCompliance),
    /// Replace the SOX posture.
    Sox(SoxCompliance),
}

impl ComplianceUpdate {
    /// Wire name of the framework this update targets.
    pub fn framework(&self) -> &'static str {
        match self {
            Self::Gdpr(_) => "gdpr",
            Self::Ccpa(_) => "ccpa",
            Self::Hipaa(_) => "hipaa",
            Self::Sox(_) => "sox",
        }
    }
}

/// Compliance state stored on an identity: per-framework postures plus the
/// append-only audit log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceData {
    /// GDPR posture, if initialized.
    pub gdpr: Option<GdprCompliance>,
    /// CCPA posture, if initialized.
    pub ccpa: Option<CcpaCompliance>,
    /// HIPAA posture, if initialized.
    pub hipaa: Option<HipaaCompliance>,
    /// SOX posture, if initialized.
    pub sox: Option<SoxCompliance>,
    /// When the last audit ran.
    pub last_audit: Option<Timestamp>,
    /// When the next audit is due.
    pub next_audit: Option<Timestamp>,
    /// Append-only log of audit results.
    #[serde(default)]
    pub audit_results: Vec<AuditResult>,
}

impl ComplianceData {
    /// Fresh compliance state with all four framework postures present at
    /// their defaults, as seeded by identity creation.
    pub fn with_defaults() -> Self {
        Self {
            gdpr: Some(GdprCompliance::default()),
            ccpa: Some(CcpaCompliance::default()),
            hipaa: Some(HipaaCompliance::default()),
            sox: Some(SoxCompliance::default()),
            last_audit: None,
            next_audit: None,
            audit_results: Vec::new(),
        }
    }

    /// Merge one framework update into this state.
    pub fn apply(&mut self, update: ComplianceUpdate) {
        match update {
            ComplianceUpdate::Gdpr(gdpr) => self.gdpr = Some(gdpr),
            ComplianceUpdate::Ccpa(ccpa) => self.ccpa = Some(ccpa),
            ComplianceUpdate::Hipaa(hipaa) => self.hipaa = Some(hipaa),
            ComplianceUpdate::Sox(sox) => self.sox = Some(sox),
        }
    }
}

impl IdentityRegistry {
    /// Merge a typed compliance payload into an identity.
    pub fn update_compliance(
        &mut self,
        ctx: &BlockContext,
        identity_id: &IdentityId,
        update: ComplianceUpdate,
        auditor: &AccountId,
    ) -> Result<(), LedgerError> {
        let mut identity = self.must_get(identity_id)?;
        self.authorize(ctx, &identity, auditor, "update_compliance")?;

        let framework = update.framework();
        identity.compliance_data.apply(update);
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert("compliance_type".into(), Value::from(framework));
        self.record_audit_entry(
            ctx,
            identity_id.as_str(),
            "UPDATE_COMPLIANCE",
            auditor,
            "success",
            changes,
        )?;

        info!(
            identity_id = %identity_id,
            compliance_type = framework,
            auditor = %auditor,
            "compliance data updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::*;
    use crate::registry::SecurityLevel;

    #[test]
    fn defaults_initialize_all_frameworks() {
        let data = ComplianceData::with_defaults();
        assert!(data.gdpr.is_some());
        assert!(data.ccpa.is_some());
        assert!(data.hipaa.is_some());
        assert!(data.sox.is_some());
        assert!(!data.gdpr.unwrap().consent_given);
    }

    #[test]
    fn apply_replaces_only_the_target_framework() {
        let mut data = ComplianceData::with_defaults();
        data.apply(ComplianceUpdate::Gdpr(GdprCompliance {
            lawful_basis: "consent".into(),
            consent_given: true,
            right_to_erasure: true,
            ..Default::default()
        }));
        assert!(data.gdpr.as_ref().unwrap().consent_given);
        assert!(!data.ccpa.as_ref().unwrap().right_to_delete);
    }

    #[test]
    fn update_compliance_persists() {
        let mut registry = registry();
        let identity = registry
            .create_identity(&ctx(), &account("c"), vec![], SecurityLevel::Basic)
            .unwrap();
        let owner = account(identity.did.as_str());

        registry
            .update_compliance(
                &ctx(),
                &identity.id,
                ComplianceUpdate::Ccpa(CcpaCompliance {
                    right_to_delete: true,
                    right_to_know: true,
                    ..Default::default()
                }),
                &owner,
            )
            .unwrap();

        let stored = registry.get(&identity.id).unwrap().unwrap();
        assert!(stored.compliance_data.ccpa.unwrap().right_to_delete);
        assert_eq!(stored.updated_at, ctx().now);
    }

    #[test]
    fn update_compliance_unknown_identity_is_not_found() {
        let mut registry = registry();
        let err = registry
            .update_compliance(
                &ctx(),
                &IdentityId::new("identity-0-0"),
                ComplianceUpdate::Sox(SoxCompliance::default()),
                &account("auditor"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn update_compliance_requires_permission() {
        let mut registry = registry();
        let identity = registry
            .create_identity(&ctx(), &account("c"), vec![], SecurityLevel::Basic)
            .unwrap();
        let err = registry
            .update_compliance(
                &ctx(),
                &identity.id,
                ComplianceUpdate::Hipaa(HipaaCompliance::default()),
                &account("stranger"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn compliance_update_tagged_serde() {
        let update = ComplianceUpdate::Gdpr(GdprCompliance::default());
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains(r#""framework":"gdpr""#));
        let back: ComplianceUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }
}
