//! Store namespaces for the identity registry.

use attest_store::KeyPrefix;

/// Primary identity records, keyed by identity id.
pub(crate) const IDENTITIES: KeyPrefix = KeyPrefix::new("identity/");

/// DID → identity id mapping, maintained alongside every identity write.
pub(crate) const DID_TO_IDENTITY: KeyPrefix = KeyPrefix::new("did_to_identity/");

/// W3C-enveloped credentials, keyed by credential id.
pub(crate) const CREDENTIALS: KeyPrefix = KeyPrefix::new("credential/");

/// Append-only audit trail, grouped by resource id with a zero-padded
/// sequence suffix so scans return entries in append order.
pub(crate) const AUDIT_ENTRIES: KeyPrefix = KeyPrefix::new("audit_entry/");

pub(crate) const IDENTITY_SEQUENCE_KEY: &[u8] = b"seq/identity";
pub(crate) const CREDENTIAL_SEQUENCE_KEY: &[u8] = b"seq/credential";
pub(crate) const PERMISSION_SEQUENCE_KEY: &[u8] = b"seq/permission";
pub(crate) const AUDIT_SEQUENCE_KEY: &[u8] = b"seq/audit";
