//! # Compliance Audits
//!
//! The audit engine is a pure, deterministic scoring function over an
//! identity's compliance fields: each framework rule starts at 100 and
//! subtracts fixed penalties for missing or false required fields, pairing
//! every finding with a remediation string. Identical compliance data
//! always produces identical scores and findings — there are no external
//! calls and no randomness.
//!
//! Results append to the identity's audit log; the log is never rewritten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use attest_core::{AccountId, AuditId, BlockContext, IdentityId, LedgerError, Timestamp};
use attest_store::{next_sequence, put_json};

use crate::compliance::ComplianceData;
use crate::keys::{AUDIT_ENTRIES, AUDIT_SEQUENCE_KEY};
use crate::registry::IdentityRegistry;

/// Days until the next audit is due after one completes.
const AUDIT_INTERVAL_DAYS: i64 = 90;

/// Which scoring rules an audit runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditType {
    /// GDPR rules only.
    Gdpr,
    /// CCPA rules only.
    Ccpa,
    /// HIPAA rules only.
    Hipaa,
    /// SOX rules only.
    Sox,
    /// All four frameworks, averaged.
    Comprehensive,
}

impl AuditType {
    /// Wire name of the audit type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gdpr => "gdpr",
            Self::Ccpa => "ccpa",
            Self::Hipaa => "hipaa",
            Self::Sox => "sox",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Resolve a wire name to an audit type.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "gdpr" => Ok(Self::Gdpr),
            "ccpa" => Ok(Self::Ccpa),
            "hipaa" => Ok(Self::Hipaa),
            "sox" => Ok(Self::Sox),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(LedgerError::invalid_request(format!(
                "unsupported audit type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status bucket derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Score ≥ 90.
    Excellent,
    /// Score ≥ 75.
    Good,
    /// Score ≥ 60.
    Acceptable,
    /// Anything below 60.
    RequiresAttention,
}

impl AuditStatus {
    /// Bucket a score.
    pub fn from_score(score: i64) -> Self {
        if score >= 90 {
            Self::Excellent
        } else if score >= 75 {
            Self::Good
        } else if score >= 60 {
            Self::Acceptable
        } else {
            Self::RequiresAttention
        }
    }

    /// Wire name of the bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::RequiresAttention => "requires_attention",
        }
    }
}

/// An immutable audit result, appended to the identity's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Unique audit id.
    pub audit_id: AuditId,
    /// Which rules ran.
    pub audit_type: AuditType,
    /// Status bucket for the score.
    pub status: AuditStatus,
    /// Score in 0–100.
    pub score: i64,
    /// What the rules flagged.
    pub findings: Vec<String>,
    /// One remediation per finding, in the same order.
    pub remediation: Vec<String>,
    /// When the audit ran (block time).
    pub audit_date: Timestamp,
    /// When the next audit is due.
    pub next_audit_due: Timestamp,
}

/// One entry in the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry id.
    pub id: AuditId,
    /// When the action happened (block time).
    pub timestamp: Timestamp,
    /// Action name, e.g. `CREATE_IDENTITY` or `VERIFY_ZK_PROOF`.
    pub action: String,
    /// Who performed it.
    pub actor: AccountId,
    /// The entity acted upon.
    pub resource: String,
    /// Outcome, `success` or `failed`.
    pub result: String,
    /// Action-specific detail.
    #[serde(default)]
    pub changes: Map<String, Value>,
    /// Fixed per-action risk weight.
    pub risk_score: u32,
}

/// Outcome of one framework's scoring rules.
struct FrameworkScore {
    score: i64,
    findings: Vec<String>,
    remediation: Vec<String>,
}

impl FrameworkScore {
    fn full() -> Self {
        Self {
            score: 100,
            findings: Vec::new(),
            remediation: Vec::new(),
        }
    }

    fn flag(&mut self, penalty: i64, finding: &str, remediation: &str) {
        self.score -= penalty;
        self.findings.push(finding.to_string());
        self.remediation.push(remediation.to_string());
    }
}

fn score_gdpr(data: &ComplianceData) -> FrameworkScore {
    let mut result = FrameworkScore::full();
    match &data.gdpr {
        None => result.flag(
            20,
            "GDPR compliance data not initialized",
            "Initialize GDPR compliance data",
        ),
        Some(gdpr) => {
            if !gdpr.consent_given {
                result.flag(
                    15,
                    "User consent not properly documented",
                    "Obtain and document proper user consent",
                );
            }
            if gdpr.lawful_basis.is_empty() {
                result.flag(
                    10,
                    "Lawful basis for processing not specified",
                    "Document lawful basis for data processing",
                );
            }
            if !gdpr.right_to_erasure {
                result.flag(
                    10,
                    "Right to erasure not implemented",
                    "Implement right to erasure functionality",
                );
            }
        }
    }
    result
}

fn score_ccpa(data: &ComplianceData) -> FrameworkScore {
    let mut result = FrameworkScore::full();
    match &data.ccpa {
        None => result.flag(
            20,
            "CCPA compliance data not initialized",
            "Initialize CCPA compliance data",
        ),
        Some(ccpa) => {
            if !ccpa.right_to_delete {
                result.flag(
                    15,
                    "Right to delete not implemented",
                    "Implement right to delete functionality",
                );
            }
            if !ccpa.right_to_know {
                result.flag(
                    10,
                    "Right to know not implemented",
                    "Implement right to know functionality",
                );
            }
        }
    }
    result
}

fn score_hipaa(data: &ComplianceData) -> FrameworkScore {
    let mut result = FrameworkScore::full();
    match &data.hipaa {
        // Less critical when no health data is in scope.
        None => result.flag(
            10,
            "HIPAA compliance data not initialized",
            "Initialize HIPAA compliance data if handling PHI",
        ),
        Some(hipaa) => {
            if hipaa.phi_processed && !hipaa.security_rule {
                result.flag(
                    25,
                    "HIPAA Security Rule not implemented while processing PHI",
                    "Implement HIPAA Security Rule compliance",
                );
            }
            if hipaa.phi_processed && !hipaa.privacy_rule {
                result.flag(
                    25,
                    "HIPAA Privacy Rule not implemented while processing PHI",
                    "Implement HIPAA Privacy Rule compliance",
                );
            }
        }
    }
    result
}

fn score_sox(data: &ComplianceData) -> FrameworkScore {
    let mut result = FrameworkScore::full();
    match &data.sox {
        None => result.flag(
            5,
            "SOX compliance data not initialized",
            "Initialize SOX compliance data if applicable",
        ),
        Some(sox) => {
            if sox.public_company && !sox.internal_controls {
                result.flag(
                    20,
                    "Internal controls not implemented for public company",
                    "Implement SOX internal controls",
                );
            }
            if sox.financial_reporting && !sox.auditor_independence {
                result.flag(
                    15,
                    "Auditor independence not maintained",
                    "Ensure auditor independence compliance",
                );
            }
        }
    }
    result
}

/// Run the scoring rules for one audit type over compliance data.
///
/// Pure: identical input always yields identical output. A comprehensive
/// audit runs all four frameworks, concatenates their findings, and
/// averages their scores (integer division). Scores floor at 0.
pub fn evaluate_audit(
    data: &ComplianceData,
    audit_type: AuditType,
) -> (i64, Vec<String>, Vec<String>) {
    let parts: Vec<FrameworkScore> = match audit_type {
        AuditType::Gdpr => vec![score_gdpr(data)],
        AuditType::Ccpa => vec![score_ccpa(data)],
        AuditType::Hipaa => vec![score_hipaa(data)],
        AuditType::Sox => vec![score_sox(data)],
        AuditType::Comprehensive => vec![
            score_gdpr(data),
            score_ccpa(data),
            score_hipaa(data),
            score_sox(data),
        ],
    };

    let divisor = parts.len() as i64;
    let mut total = 0;
    let mut findings = Vec::new();
    let mut remediation = Vec::new();
    for part in parts {
        total += part.score;
        findings.extend(part.findings);
        remediation.extend(part.remediation);
    }
    ((total / divisor).max(0), findings, remediation)
}

impl IdentityRegistry {
    /// Run a compliance audit and append the result to the identity's
    /// audit log.
    pub fn perform_audit(
        &mut self,
        ctx: &BlockContext,
        identity_id: &IdentityId,
        audit_type: AuditType,
        auditor: &AccountId,
    ) -> Result<AuditResult, LedgerError> {
        let mut identity = self.must_get(identity_id)?;

        let (score, findings, remediation) =
            evaluate_audit(&identity.compliance_data, audit_type);
        let seq = next_sequence(&mut self.store, AUDIT_SEQUENCE_KEY);
        let result = AuditResult {
            audit_id: AuditId::new(format!("audit-{}-{}", ctx.height, seq)),
            audit_type,
            status: AuditStatus::from_score(score),
            score,
            findings,
            remediation,
            audit_date: ctx.now,
            next_audit_due: ctx.now.plus_days(AUDIT_INTERVAL_DAYS),
        };

        identity.compliance_data.audit_results.push(result.clone());
        identity.compliance_data.last_audit = Some(ctx.now);
        identity.compliance_data.next_audit = Some(result.next_audit_due);
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert("audit_type".into(), Value::from(audit_type.as_str()));
        changes.insert("audit_score".into(), Value::from(result.score));
        changes.insert(
            "findings_count".into(),
            Value::from(result.findings.len() as u64),
        );
        self.record_audit_entry(
            ctx,
            identity_id.as_str(),
            "PERFORM_AUDIT",
            auditor,
            "success",
            changes,
        )?;

        info!(
            identity_id = %identity_id,
            audit_type = %audit_type,
            score = result.score,
            status = result.status.as_str(),
            "compliance audit performed"
        );
        Ok(result)
    }

    /// Append an entry to the audit trail. Entries are written regardless
    /// of the outcome they record; verification attempts land here too.
    pub fn record_audit_entry(
        &mut self,
        ctx: &BlockContext,
        resource: &str,
        action: &str,
        actor: &AccountId,
        result: &str,
        changes: Map<String, Value>,
    ) -> Result<AuditId, LedgerError> {
        let seq = next_sequence(&mut self.store, AUDIT_SEQUENCE_KEY);
        let entry = AuditEntry {
            id: AuditId::new(format!("audit-{}-{}", ctx.height, seq)),
            timestamp: ctx.now,
            action: action.to_string(),
            actor: actor.clone(),
            resource: resource.to_string(),
            result: result.to_string(),
            changes,
            risk_score: risk_score(action),
        };
        put_json(
            &mut self.store,
            AUDIT_ENTRIES.index_key(resource, &format!("{seq:020}")),
            &entry,
        )?;
        Ok(entry.id)
    }

    /// The audit trail for one resource, in append order.
    pub fn audit_trail(&self, resource: &str) -> Result<Vec<AuditEntry>, LedgerError> {
        self.store
            .prefix_scan(&AUDIT_ENTRIES.group_prefix(resource))
            .map(|(_, bytes)| {
                serde_json::from_slice(bytes).map_err(|e| {
                    LedgerError::invalid_request(format!("store decode failed: {e}"))
                })
            })
            .collect()
    }
}

/// Fixed risk weight per action kind.
fn risk_score(action: &str) -> u32 {
    match action {
        "CREATE_IDENTITY" => 10,
        "ADD_PROTOCOL" => 20,
        "UPDATE_IDENTITY" => 30,
        "ISSUE_CREDENTIAL" => 40,
        "ISSUE_ZK_CREDENTIAL" => 50,
        "UPDATE_COMPLIANCE" => 60,
        "GRANT_PERMISSION" => 70,
        _ => 25,
    }
}
