//! # Serialized event record and the identity codec over it.
//!
//! [`serialize`] and [`deserialize`] are the identity transformation at this
//! layer — no compression, no versioning. Their sole job is to pin down the
//! wire shape (`{ event, data }`) so every role agrees on field names.
//!
//! Contract: `deserialize(serialize(k, v)) == Decoded { kind: k, data: v }`
//! for all `k, v`.

use serde::{Deserialize, Serialize};

/// Payload carried by an event.
///
/// Restricted to values that survive a structured-clone-like boundary:
/// primitives, plain records, ordered sequences. No live object references,
/// no cycles.
pub type Payload = serde_json::Value;

/// The serialized event record as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Subscriber key. Unique per event map, not globally namespaced.
    pub event: String,
    /// Structured-clone-safe payload.
    pub data: Payload,
}

/// The in-memory view of a decoded [`WireEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The subscriber key the event was serialized under.
    pub kind: String,
    /// The payload, untouched.
    pub data: Payload,
}

/// Serializes an event name and payload into the wire record.
#[inline]
pub fn serialize(event: impl Into<String>, data: Payload) -> WireEvent {
    WireEvent {
        event: event.into(),
        data,
    }
}

/// Decodes a wire record back into its name and payload.
#[inline]
pub fn deserialize(wire: WireEvent) -> Decoded {
    Decoded {
        kind: wire.event,
        data: wire.data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_identity() {
        let payloads = [
            json!(null),
            json!(42),
            json!("text"),
            json!([1, 2, 3]),
            json!({"nested": {"deep": true}}),
        ];

        for payload in payloads {
            let decoded = deserialize(serialize("k", payload.clone()));
            assert_eq!(decoded.kind, "k");
            assert_eq!(decoded.data, payload);
        }
    }

    #[test]
    fn test_wire_field_names_are_pinned() {
        let wire = serialize("ping", json!({"n": 1}));
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value, json!({"event": "ping", "data": {"n": 1}}));
    }
}
