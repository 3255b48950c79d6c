//! # DID Oracle Interface
//!
//! The ledger never owns DID documents. It consumes a read-only oracle
//! supplied by the host: `lookup(did)` returns the document and its
//! active/deactivated status, or nothing when the DID is unknown. All
//! components read the oracle; none mutates it.
//!
//! Lookups must be synchronous and side-effect-free — the oracle sits inside
//! the deterministic transaction boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::Did;

/// A verification method published in a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Method id, a DID URL such as `did:attest:issuer-a#keys-1`.
    pub id: String,
    /// Key suite name, e.g. `Ed25519VerificationKey2020`.
    pub key_type: String,
    /// Hex-encoded public key bytes.
    pub public_key_hex: String,
}

/// A resolved DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// The DID this document describes.
    pub id: Did,
    /// Verification methods usable for proof checks.
    pub verification_methods: Vec<VerificationMethod>,
}

impl DidDocument {
    /// Find a verification method by full DID URL or bare fragment.
    pub fn verification_method(&self, method_id: &str) -> Option<&VerificationMethod> {
        self.verification_methods.iter().find(|m| {
            m.id == method_id
                || m.id
                    .rsplit_once('#')
                    .is_some_and(|(_, frag)| frag == method_id)
        })
    }
}

/// The result of a DID lookup: the document plus its activation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidRecord {
    /// The resolved document.
    pub document: DidDocument,
    /// Whether the DID is active. Deactivated DIDs resolve but must be
    /// rejected at issuance time.
    pub active: bool,
}

/// Read-only DID resolution supplied by the host.
pub trait DidOracle {
    /// Resolve a DID. `None` means the DID is unknown.
    fn lookup(&self, did: &Did) -> Option<DidRecord>;
}

/// In-memory oracle for hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryDidOracle {
    records: BTreeMap<String, DidRecord>,
}

impl MemoryDidOracle {
    /// Create an empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active DID with the given verification methods.
    pub fn register(&mut self, did: Did, methods: Vec<VerificationMethod>) {
        self.records.insert(
            did.as_str().to_string(),
            DidRecord {
                document: DidDocument {
                    id: did,
                    verification_methods: methods,
                },
                active: true,
            },
        );
    }

    /// Mark a registered DID as deactivated. Unknown DIDs are ignored.
    pub fn deactivate(&mut self, did: &Did) {
        if let Some(record) = self.records.get_mut(did.as_str()) {
            record.active = false;
        }
    }
}

impl DidOracle for MemoryDidOracle {
    fn lookup(&self, did: &Did) -> Option<DidRecord> {
        self.records.get(did.as_str()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn did(s: &str) -> Did {
        Did::parse(s).unwrap()
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let oracle = MemoryDidOracle::new();
        assert!(oracle.lookup(&did("did:attest:nobody")).is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut oracle = MemoryDidOracle::new();
        oracle.register(did("did:attest:a"), vec![]);
        let record = oracle.lookup(&did("did:attest:a")).unwrap();
        assert!(record.active);
        assert_eq!(record.document.id, did("did:attest:a"));
    }

    #[test]
    fn test_deactivate() {
        let mut oracle = MemoryDidOracle::new();
        oracle.register(did("did:attest:a"), vec![]);
        oracle.deactivate(&did("did:attest:a"));
        assert!(!oracle.lookup(&did("did:attest:a")).unwrap().active);
    }

    #[test]
    fn test_verification_method_lookup_by_fragment() {
        let doc = DidDocument {
            id: did("did:attest:a"),
            verification_methods: vec![VerificationMethod {
                id: "did:attest:a#keys-1".to_string(),
                key_type: "Ed25519VerificationKey2020".to_string(),
                public_key_hex: "00".repeat(32),
            }],
        };
        assert!(doc.verification_method("did:attest:a#keys-1").is_some());
        assert!(doc.verification_method("keys-1").is_some());
        assert!(doc.verification_method("keys-2").is_none());
    }
}
