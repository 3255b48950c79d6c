//! # attest-identity — Identity Registry
//!
//! Owns `UniversalIdentity` records: multi-protocol identity aggregates with
//! capability permissions, typed compliance data, an append-only audit
//! trail, and the W3C-envelope credential path.
//!
//! ## Modules
//!
//! - **Registry** (`registry.rs`): the `IdentityRegistry` component —
//!   identity creation, partial updates, protocol sub-identities, and the
//!   DID → identity index.
//!
//! - **Permission** (`permission.rs`): time-bounded capability grants
//!   scoped to an identity, resource, and action. Lapse is checked lazily
//!   at use time; nothing sweeps expired grants.
//!
//! - **Compliance** (`compliance.rs`): closed, typed compliance payloads
//!   per framework (GDPR/CCPA/HIPAA/SOX) — no untyped maps feeding the
//!   audit rules.
//!
//! - **Audit** (`audit.rs`): the deterministic compliance scoring engine
//!   and the append-only audit structures.
//!
//! - **Credential** (`credential.rs`): issuance, verification, and
//!   revocation of W3C-enveloped credentials bound to registered subject
//!   identities, with real Ed25519 proof checking through the DID oracle.

pub mod audit;
pub mod compliance;
pub mod credential;
mod keys;
pub mod permission;
pub mod registry;

pub use audit::{AuditEntry, AuditResult, AuditStatus, AuditType};
pub use compliance::{
    CcpaCompliance, ComplianceData, ComplianceUpdate, GdprCompliance, HipaaCompliance,
    SoxCompliance,
};
pub use credential::{CredentialVerification, StoredCredential, VerifiableCredential};
pub use permission::{Permission, PermissionEffect};
pub use registry::{
    IdentityRegistry, IdentityUpdates, ProtocolIdentity, ProtocolType, SecurityLevel,
    UniversalIdentity,
};
