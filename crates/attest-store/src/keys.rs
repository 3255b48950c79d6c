//! # Typed Key Builders
//!
//! Every key written to a component store is built by a `KeyPrefix`. Key
//! segments are `/`-terminated, so `record_key("a")` can never collide with
//! `record_key("ab")` and a group prefix is always a proper scan boundary.
//!
//! Composite index keys pair a grouping attribute (an issuer DID, a subject
//! DID, a holder DID) with the record id: `prefix + group + "/" + id + "/"`.
//! Scanning `group_prefix(group)` yields exactly the ids indexed under that
//! group.

/// A typed, compile-time-fixed key namespace within a component store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPrefix(&'static str);

impl KeyPrefix {
    /// Define a namespace. By convention the literal ends with `/`.
    pub const fn new(prefix: &'static str) -> Self {
        Self(prefix)
    }

    /// Key for a primary record: `prefix + id + "/"`.
    pub fn record_key(&self, id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + id.len() + 1);
        key.extend_from_slice(self.0.as_bytes());
        key.extend_from_slice(id.as_bytes());
        key.push(b'/');
        key
    }

    /// Key for a composite index entry: `prefix + group + "/" + id + "/"`.
    pub fn index_key(&self, group: &str, id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + group.len() + id.len() + 2);
        key.extend_from_slice(self.0.as_bytes());
        key.extend_from_slice(group.as_bytes());
        key.push(b'/');
        key.extend_from_slice(id.as_bytes());
        key.push(b'/');
        key
    }

    /// Scan boundary covering every entry of one index group.
    pub fn group_prefix(&self, group: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + group.len() + 1);
        key.extend_from_slice(self.0.as_bytes());
        key.extend_from_slice(group.as_bytes());
        key.push(b'/');
        key
    }

    /// Scan boundary covering the whole namespace.
    pub fn scan_prefix(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}
