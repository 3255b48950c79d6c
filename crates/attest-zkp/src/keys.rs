//! Store namespaces for the ZK credential subsystem.

use attest_store::KeyPrefix;

/// Primary records, keyed by ZK credential id.
pub(crate) const ZK_CREDENTIALS: KeyPrefix = KeyPrefix::new("zk_credential/");

/// Secondary index: holder DID → ZK credential id.
pub(crate) const ZK_BY_HOLDER: KeyPrefix = KeyPrefix::new("zk_by_holder/");

/// Sequence counter backing deterministic id minting.
pub(crate) const ZK_SEQUENCE_KEY: &[u8] = b"seq/zk_credential";
