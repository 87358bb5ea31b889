//! # The addressed unit of transport between roles.

use serde::{Deserialize, Serialize};

use crate::error::BusError;
use crate::routing::Destination;

use super::wire::WireEvent;

/// Destination mask plus serialized event — the record every transport
/// carries verbatim.
///
/// ### Example
/// ```rust
/// use relaybus::{serialize, Destination, Envelope};
///
/// let env = Envelope::new(
///     Destination::BACKGROUND,
///     serialize("ping", serde_json::json!({"n": 1})),
/// );
/// assert!(env.destination.is_background());
/// assert_eq!(env.data.event, "ping");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Which role(s) this envelope targets.
    pub destination: Destination,
    /// The serialized event.
    pub data: WireEvent,
}

impl Envelope {
    /// Creates an envelope addressed at `destination`.
    pub fn new(destination: Destination, data: WireEvent) -> Self {
        Self { destination, data }
    }

    /// Tolerant decode for byte-oriented transports.
    ///
    /// Returns `None` for anything that is not a well-formed envelope —
    /// unparseable input or a destination with no role bits. Never an error:
    /// malformed traffic is dropped at the wiring boundary.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Envelope>(raw)
            .ok()
            .filter(|env| env.destination.has_role_bits())
    }

    /// Encodes the envelope as JSON for byte-oriented transports.
    pub fn to_json(&self) -> Result<String, BusError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::serialize;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let env = Envelope::new(
            Destination::CONTEXT | Destination::CONTENT,
            serialize("state", json!({"ready": true})),
        );
        let raw = env.to_json().unwrap();
        let back = Envelope::parse(&raw).expect("well-formed envelope must parse");
        assert_eq!(back, env);
    }

    #[test]
    fn test_wire_shape_is_bit_exact() {
        let env = Envelope::new(Destination::BACKGROUND, serialize("ping", json!(1)));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"destination": 0b100, "data": {"event": "ping", "data": 1}})
        );
    }

    #[test]
    fn test_parse_rejects_zero_destination() {
        let raw = r#"{"destination": 0, "data": {"event": "x", "data": null}}"#;
        assert!(Envelope::parse(raw).is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Envelope::parse("not json").is_none());
        assert!(Envelope::parse(r#"{"data": {"event": "x", "data": 1}}"#).is_none());
    }
}
