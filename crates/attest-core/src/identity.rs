//! # Domain Identifier Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Attest Ledger. These
//! prevent accidental identifier confusion — you cannot pass a
//! `CredentialId` where an `IdentityId` is expected.
//!
//! Identifiers are minted deterministically by the owning component (block
//! height plus a store-backed sequence counter), never from a random source,
//! so the wrappers hold strings rather than UUIDs.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A decentralized identifier, e.g. `did:attest:identity-7-1`.
///
/// Construction via [`Did::parse`] validates the `did:<method>:<id>` shape;
/// it does not resolve the DID — resolution is the oracle's job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Did(String);

impl Did {
    /// Parse a DID string, validating the `did:<method>:<id>` shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the scheme is not `did`, or when the
    /// method or method-specific id segment is empty.
    pub fn parse(s: impl Into<String>) -> Result<Self, LedgerError> {
        let s = s.into();
        let mut parts = s.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        let method = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        if scheme != "did" || method.is_empty() || id.is_empty() {
            return Err(LedgerError::invalid_request(format!(
                "malformed DID: {s:?}"
            )));
        }
        Ok(Self(s))
    }

    /// The DID method segment, e.g. `attest` for `did:attest:…`.
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// The full DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An account address as delivered by the surrounding runtime.
///
/// The host authenticates the transaction signature; this type only enforces
/// that the principal string is usable as a key: non-empty, no whitespace,
/// bounded length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Maximum accepted address length.
    pub const MAX_LEN: usize = 128;

    /// Parse an account address.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty string, embedded whitespace, or
    /// an address longer than [`AccountId::MAX_LEN`].
    pub fn parse(s: impl Into<String>) -> Result<Self, LedgerError> {
        let s = s.into();
        if s.is_empty() {
            return Err(LedgerError::invalid_request("account address is empty"));
        }
        if s.len() > Self::MAX_LEN {
            return Err(LedgerError::invalid_request(format!(
                "account address exceeds {} bytes",
                Self::MAX_LEN
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(LedgerError::invalid_request(
                "account address contains whitespace",
            ));
        }
        Ok(Self(s))
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// The identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty (rejected by message
            /// validation).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Unique identifier for a universal identity.
    IdentityId
}

string_id! {
    /// Unique identifier for a verifiable credential (ledger or W3C path).
    CredentialId
}

string_id! {
    /// Unique identifier for a zero-knowledge credential.
    ZkCredentialId
}

string_id! {
    /// Unique identifier for a capability permission grant.
    PermissionId
}

string_id! {
    /// Unique identifier for an audit result or audit-trail entry.
    AuditId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_parse_accepts_well_formed() {
        let did = Did::parse("did:attest:identity-7-1").unwrap();
        assert_eq!(did.method(), "attest");
        assert_eq!(did.as_str(), "did:attest:identity-7-1");
    }

    #[test]
    fn test_did_parse_accepts_colons_in_id() {
        let did = Did::parse("did:web:example.com:user:alice").unwrap();
        assert_eq!(did.method(), "web");
    }

    #[test]
    fn test_did_parse_rejects_malformed() {
        assert!(Did::parse("").is_err());
        assert!(Did::parse("did:").is_err());
        assert!(Did::parse("did:attest").is_err());
        assert!(Did::parse("did::x").is_err());
        assert!(Did::parse("urn:attest:x").is_err());
    }

    #[test]
    fn test_account_parse() {
        assert!(AccountId::parse("attest1qxyz").is_ok());
        assert!(AccountId::parse("did:attest:issuer-a").is_ok());
        assert!(AccountId::parse("").is_err());
        assert!(AccountId::parse("has space").is_err());
        assert!(AccountId::parse("x".repeat(129)).is_err());
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time property; the assertions just exercise the wrappers.
        let c = CredentialId::new("vc-1");
        let i = IdentityId::new("identity-7-1");
        assert_eq!(c.as_str(), "vc-1");
        assert_eq!(i.to_string(), "identity-7-1");
        assert!(!c.is_empty());
        assert!(CredentialId::new("").is_empty());
    }

    #[test]
    fn test_serde_is_transparent() {
        let did = Did::parse("did:attest:x").unwrap();
        assert_eq!(serde_json::to_string(&did).unwrap(), "\"did:attest:x\"");
        let back: Did = serde_json::from_str("\"did:attest:x\"").unwrap();
        assert_eq!(back, did);
    }
}
