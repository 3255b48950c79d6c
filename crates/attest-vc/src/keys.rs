//! Store namespaces for the credential ledger.

use attest_store::KeyPrefix;

/// Primary records, keyed by credential id.
pub(crate) const VC_RECORDS: KeyPrefix = KeyPrefix::new("vc_record/");

/// Secondary index: issuer DID → credential id.
pub(crate) const VC_BY_ISSUER: KeyPrefix = KeyPrefix::new("vc_by_issuer/");

/// Secondary index: subject DID → credential id.
pub(crate) const VC_BY_SUBJECT: KeyPrefix = KeyPrefix::new("vc_by_subject/");
