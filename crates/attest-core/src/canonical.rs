//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes used in
//! digest and signature computation across the workspace.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which rejects floats and
//! then serializes with `serde_jcs` (RFC 8785: sorted keys, compact
//! separators, deterministic byte sequence). Any function requiring
//! canonical bytes must accept `&CanonicalBytes`, so a non-canonical digest
//! path cannot exist.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Numeric values are integers or strings, never floats.
/// - Serialization uses sorted keys with compact separators (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value
    /// contains a float, or [`CanonicalizationError::SerializationFailed`]
    /// if JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest or signature computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively reject float values.
///
/// Floats have non-deterministic serialization edge cases across languages;
/// amounts and scores must be integers or strings.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if n.is_f64() && !n.is_i64() && !n.is_u64() => {
            Err(CanonicalizationError::FloatRejected(
                n.as_f64().unwrap_or(f64::NAN),
            ))
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_sorted_compact_output() {
        let mut data = BTreeMap::new();
        data.insert("b", 2);
        data.insert("a", 1);
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let v1 = serde_json::json!({"x": 1, "y": {"b": 2, "a": 3}});
        let v2 = serde_json::json!({"y": {"a": 3, "b": 2}, "x": 1});
        assert_eq!(
            CanonicalBytes::new(&v1).unwrap(),
            CanonicalBytes::new(&v2).unwrap()
        );
    }

    #[test]
    fn test_floats_rejected() {
        let v = serde_json::json!({"amount": 1.5});
        assert!(matches!(
            CanonicalBytes::new(&v),
            Err(CanonicalizationError::FloatRejected(_))
        ));
    }

    #[test]
    fn test_nested_floats_rejected() {
        let v = serde_json::json!({"outer": [{"inner": 0.1}]});
        assert!(CanonicalBytes::new(&v).is_err());
    }

    #[test]
    fn test_integers_and_strings_accepted() {
        let v = serde_json::json!({"n": 42, "s": "1.5", "neg": -7, "big": 9007199254740993i64});
        assert!(CanonicalBytes::new(&v).is_ok());
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    proptest! {
        // Same logical value canonicalizes to the same bytes, every time.
        #[test]
        fn prop_canonicalization_is_deterministic(
            keys in proptest::collection::vec("[a-z]{1,8}", 0..8),
            vals in proptest::collection::vec(any::<i64>(), 0..8),
        ) {
            let map: BTreeMap<_, _> = keys.iter().cloned().zip(vals.iter().cloned()).collect();
            let a = CanonicalBytes::new(&map).unwrap();
            let b = CanonicalBytes::new(&map).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
