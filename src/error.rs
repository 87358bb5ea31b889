//! Error types used by the relaybus core.
//!
//! There is a single public enum, [`BusError`], covering programmer-facing
//! failures raised on the emit path and the two-phase activation contract.
//! Receive-side problems (malformed envelopes, unreachable roles) are by
//! design not errors: the wiring layer drops them silently.

use thiserror::Error;

/// # Errors produced by the bus core.
///
/// All variants are raised at call sites owned by the application (emitting,
/// activating). Inbound traffic never produces a `BusError`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The destination mask encodes no role bits at all.
    ///
    /// This is a contract violation, surfaced at `emit` time rather than at
    /// delivery time where silence would hide the bug.
    #[error("destination mask {mask:#018b} has no role bits set")]
    EmptyDestination {
        /// The offending mask.
        mask: u16,
    },

    /// `activate()` was called on a node that is already active.
    #[error("node is already active")]
    AlreadyActive,

    /// The payload could not be converted to a wire-safe value.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use relaybus::BusError;
    ///
    /// let err = BusError::EmptyDestination { mask: 0 };
    /// assert_eq!(err.as_label(), "empty_destination");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::EmptyDestination { .. } => "empty_destination",
            BusError::AlreadyActive => "already_active",
            BusError::Serialize(_) => "serialize_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::EmptyDestination { mask } => {
                format!("no role bits in destination mask {mask:#018b}")
            }
            BusError::AlreadyActive => "node is already active".to_string(),
            BusError::Serialize(err) => format!("serialize: {err}"),
        }
    }
}
