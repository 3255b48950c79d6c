//! # Structured Events
//!
//! Every successful mutating command emits one structured event carrying at
//! least the command type and the affected entity id. Events are returned to
//! the host alongside the response; external indexers consume them, the
//! ledger itself never reads them back.

use serde::{Deserialize, Serialize};

/// A single key/value event attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    /// Attribute key, e.g. `credential_id`.
    pub key: String,
    /// Attribute value, stringified.
    pub value: String,
}

/// A structured event emitted by a successful mutating command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind, e.g. `issue_vc` or `identity_created`.
    pub kind: String,
    /// Ordered attributes.
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    /// Start a new event of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute (builder style).
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// Look up an attribute value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let ev = Event::new("issue_vc")
            .attr("id", "vc-1")
            .attr("issuer_did", "did:attest:a");
        assert_eq!(ev.kind, "issue_vc");
        assert_eq!(ev.attributes[0].key, "id");
        assert_eq!(ev.attributes[1].key, "issuer_did");
    }

    #[test]
    fn test_get() {
        let ev = Event::new("revoke_vc").attr("id", "vc-1");
        assert_eq!(ev.get("id"), Some("vc-1"));
        assert_eq!(ev.get("missing"), None);
    }
}
