//! # Universal Identities
//!
//! A `UniversalIdentity` aggregates protocol-specific sub-identities under
//! one DID. The registry mints identity ids and DIDs deterministically,
//! maintains the DID → identity index alongside every identity write, and
//! records an audit-trail entry for each mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use attest_core::{AccountId, BlockContext, Did, DidOracle, IdentityId, LedgerError, Timestamp};
use attest_store::{get_json, next_sequence, put_json, MemoryKvStore};

use crate::compliance::ComplianceData;
use crate::keys::{DID_TO_IDENTITY, IDENTITIES, IDENTITY_SEQUENCE_KEY};
use crate::permission::Permission;

/// Identity protocols an identity can aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolType {
    /// OAuth 2.0 authorization.
    OAuth2,
    /// OpenID Connect.
    Oidc,
    /// SAML assertions.
    Saml,
    /// W3C decentralized identifiers.
    Did,
    /// W3C verifiable credentials.
    Vc,
    /// W3C verifiable presentations.
    Vp,
    /// WebAuthn authenticators.
    WebAuthn,
    /// Zero-knowledge proof credentials.
    ZkProof,
}

impl ProtocolType {
    /// Wire name of the protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth2 => "oauth2",
            Self::Oidc => "oidc",
            Self::Saml => "saml",
            Self::Did => "did",
            Self::Vc => "vc",
            Self::Vp => "vp",
            Self::WebAuthn => "webauthn",
            Self::ZkProof => "zkproof",
        }
    }

    /// Resolve a wire name to a protocol.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "oauth2" => Ok(Self::OAuth2),
            "oidc" => Ok(Self::Oidc),
            "saml" => Ok(Self::Saml),
            "did" => Ok(Self::Did),
            "vc" => Ok(Self::Vc),
            "vp" => Ok(Self::Vp),
            "webauthn" => Ok(Self::WebAuthn),
            "zkproof" => Ok(Self::ZkProof),
            other => Err(LedgerError::invalid_request(format!(
                "unsupported protocol: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security posture assigned to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Password-equivalent assurance.
    Basic,
    /// Multi-factor assurance.
    Enhanced,
    /// Hardware-backed keys.
    High,
    /// Hardware-backed keys plus continuous monitoring.
    Critical,
    /// Post-quantum key material.
    QuantumSafe,
}

/// A protocol-specific sub-identity.
///
/// Immutable once added except for the verification flag, which flips when
/// the protocol connector confirms the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolIdentity {
    /// The protocol this entry belongs to.
    pub protocol: ProtocolType,
    /// Protocol-scoped identifier (subject, username, DID…).
    pub identifier: String,
    /// Claims asserted by the protocol.
    #[serde(default)]
    pub claims: Map<String, Value>,
    /// Connector-specific metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Whether the identifier has been verified with the protocol.
    pub is_verified: bool,
}

impl ProtocolIdentity {
    /// Structural validation of one entry.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.identifier.is_empty() {
            return Err(LedgerError::invalid_request(format!(
                "protocol identifier cannot be empty ({})",
                self.protocol
            )));
        }
        Ok(())
    }
}

/// A unified identity across protocols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalIdentity {
    /// Unique identity id, minted by the registry.
    pub id: IdentityId,
    /// The DID minted for this identity (`did:attest:<id>`).
    pub did: Did,
    /// Creation instant (block time).
    pub created_at: Timestamp,
    /// Last mutation instant.
    pub updated_at: Timestamp,
    /// Whether the identity is active.
    pub is_active: bool,
    /// Protocol sub-identities keyed by protocol.
    pub protocols: BTreeMap<ProtocolType, ProtocolIdentity>,
    /// Free-form identity metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Capability permissions scoped to this identity.
    pub permissions: Vec<Permission>,
    /// Assigned security posture.
    pub security_level: SecurityLevel,
    /// Typed compliance data plus the append-only audit log.
    pub compliance_data: ComplianceData,
    /// Ids of W3C credentials issued about this identity.
    #[serde(default)]
    pub credential_refs: Vec<attest_core::CredentialId>,
}

/// A closed partial update for [`IdentityRegistry::update_identity`].
///
/// Absent fields leave the identity untouched; `metadata` merges key-wise
/// rather than replacing the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityUpdates {
    /// Metadata keys to merge in.
    pub metadata: Option<Map<String, Value>>,
    /// New security level.
    pub security_level: Option<SecurityLevel>,
    /// Activate or deactivate the identity.
    pub is_active: Option<bool>,
}

impl IdentityUpdates {
    /// Whether the update carries any change at all.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.security_level.is_none() && self.is_active.is_none()
    }
}

/// The identity registry component.
pub struct IdentityRegistry {
    pub(crate) store: MemoryKvStore,
    pub(crate) oracle: Arc<dyn DidOracle>,
}

impl IdentityRegistry {
    /// Create a registry over an injected store handle and DID oracle.
    pub fn new(store: MemoryKvStore, oracle: Arc<dyn DidOracle>) -> Self {
        Self { store, oracle }
    }

    /// Create a new universal identity.
    ///
    /// Zero initial protocols is legal; each supplied entry is validated.
    /// Later entries for the same protocol overwrite earlier ones.
    pub fn create_identity(
        &mut self,
        ctx: &BlockContext,
        creator: &AccountId,
        initial_protocols: Vec<ProtocolIdentity>,
        security_level: SecurityLevel,
    ) -> Result<UniversalIdentity, LedgerError> {
        let mut protocols = BTreeMap::new();
        for entry in initial_protocols {
            entry.validate()?;
            protocols.insert(entry.protocol, entry);
        }

        let seq = next_sequence(&mut self.store, IDENTITY_SEQUENCE_KEY);
        let id = IdentityId::new(format!("identity-{}-{}", ctx.height, seq));
        let did = Did::parse(format!("did:attest:{id}"))?;

        let identity = UniversalIdentity {
            id: id.clone(),
            did,
            created_at: ctx.now,
            updated_at: ctx.now,
            is_active: true,
            protocols,
            metadata: Map::new(),
            permissions: Vec::new(),
            security_level,
            compliance_data: ComplianceData::with_defaults(),
            credential_refs: Vec::new(),
        };
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert(
            "protocols".into(),
            Value::from(identity.protocols.len() as u64),
        );
        self.record_audit_entry(ctx, id.as_str(), "CREATE_IDENTITY", creator, "success", changes)?;

        info!(
            identity_id = %identity.id,
            did = %identity.did,
            creator = %creator,
            protocols = identity.protocols.len(),
            "universal identity created"
        );
        Ok(identity)
    }

    /// Apply a partial update to an existing identity.
    pub fn update_identity(
        &mut self,
        ctx: &BlockContext,
        id: &IdentityId,
        updater: &AccountId,
        updates: IdentityUpdates,
    ) -> Result<UniversalIdentity, LedgerError> {
        let mut identity = self.must_get(id)?;
        self.authorize(ctx, &identity, updater, "update")?;

        if updates.is_empty() {
            return Ok(identity);
        }
        if let Some(metadata) = updates.metadata {
            for (key, value) in metadata {
                identity.metadata.insert(key, value);
            }
        }
        if let Some(level) = updates.security_level {
            identity.security_level = level;
        }
        if let Some(active) = updates.is_active {
            identity.is_active = active;
        }
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        self.record_audit_entry(ctx, id.as_str(), "UPDATE_IDENTITY", updater, "success", Map::new())?;
        info!(identity_id = %id, updater = %updater, "universal identity updated");
        Ok(identity)
    }

    /// Insert or overwrite a protocol sub-identity.
    pub fn add_protocol_identity(
        &mut self,
        ctx: &BlockContext,
        id: &IdentityId,
        entry: ProtocolIdentity,
        requestor: &AccountId,
    ) -> Result<UniversalIdentity, LedgerError> {
        let mut identity = self.must_get(id)?;
        self.authorize(ctx, &identity, requestor, "add_protocol")?;
        entry.validate()?;

        let protocol = entry.protocol;
        identity.protocols.insert(protocol, entry);
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert("protocol".into(), Value::from(protocol.as_str()));
        self.record_audit_entry(ctx, id.as_str(), "ADD_PROTOCOL", requestor, "success", changes)?;

        info!(identity_id = %id, protocol = %protocol, "protocol identity added");
        Ok(identity)
    }

    /// Point lookup by identity id.
    pub fn get(&self, id: &IdentityId) -> Result<Option<UniversalIdentity>, LedgerError> {
        get_json(&self.store, &IDENTITIES.record_key(id.as_str()))
    }

    /// Lookup through the DID → identity index.
    pub fn get_by_did(&self, did: &Did) -> Result<Option<UniversalIdentity>, LedgerError> {
        let Some(id_bytes) = self.store.get(&DID_TO_IDENTITY.record_key(did.as_str())) else {
            return Ok(None);
        };
        let id = IdentityId::new(String::from_utf8_lossy(id_bytes).into_owned());
        self.get(&id)
    }

    /// Lookup that fails `NotFound` when the identity is absent.
    pub(crate) fn must_get(&self, id: &IdentityId) -> Result<UniversalIdentity, LedgerError> {
        self.get(id)?
            .ok_or_else(|| LedgerError::not_found("identity", id.as_str()))
    }

    /// Write the identity record and its DID index entry. The single call
    /// site that keeps record and index paired.
    pub(crate) fn write_identity(
        &mut self,
        identity: &UniversalIdentity,
    ) -> Result<(), LedgerError> {
        put_json(
            &mut self.store,
            IDENTITIES.record_key(identity.id.as_str()),
            identity,
        )?;
        self.store.set(
            DID_TO_IDENTITY.record_key(identity.did.as_str()),
            identity.id.as_str().as_bytes().to_vec(),
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use attest_core::MemoryDidOracle;

    pub fn registry() -> IdentityRegistry {
        IdentityRegistry::new(MemoryKvStore::new(), Arc::new(MemoryDidOracle::new()))
    }

    pub fn registry_with(oracle: MemoryDidOracle) -> IdentityRegistry {
        IdentityRegistry::new(MemoryKvStore::new(), Arc::new(oracle))
    }

    pub fn ctx() -> BlockContext {
        BlockContext::new(7, Timestamp::parse("2026-01-15T12:00:00Z").unwrap())
    }

    pub fn account(s: &str) -> AccountId {
        AccountId::parse(s).unwrap()
    }

    pub fn oidc_entry(identifier: &str) -> ProtocolIdentity {
        ProtocolIdentity {
            protocol: ProtocolType::Oidc,
            identifier: identifier.to_string(),
            claims: Map::new(),
            metadata: Map::new(),
            is_verified: false,
        }
    }
}
