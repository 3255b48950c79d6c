//! # Store Codec and Sequence Counters
//!
//! One encode path and one decode path for every stored record, plus the
//! monotonic sequence counter that backs deterministic identifier minting.

use serde::de::DeserializeOwned;
use serde::Serialize;

use attest_core::LedgerError;

use crate::kv::MemoryKvStore;

/// Encode a record as JSON and write it under `key`.
pub fn put_json<T: Serialize>(
    store: &mut MemoryKvStore,
    key: Vec<u8>,
    value: &T,
) -> Result<(), LedgerError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| LedgerError::invalid_request(format!("store encode failed: {e}")))?;
    store.set(key, bytes);
    Ok(())
}

/// Read and decode the record under `key`, if present.
pub fn get_json<T: DeserializeOwned>(
    store: &MemoryKvStore,
    key: &[u8],
) -> Result<Option<T>, LedgerError> {
    match store.get(key) {
        None => Ok(None),
        Some(bytes) => serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| LedgerError::invalid_request(format!("store decode failed: {e}"))),
    }
}

/// Return the next value of a monotonic counter stored under `key`.
///
/// The first call returns 1. The counter is persisted big-endian so its raw
/// bytes order the same way its values do.
pub fn next_sequence(store: &mut MemoryKvStore, key: &[u8]) -> u64 {
    let current = store
        .get(key)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_be_bytes)
        .unwrap_or(0);
    let next = current + 1;
    store.set(key.to_vec(), next.to_be_bytes().to_vec());
    next
}
