//! # Node configuration.
//!
//! Provides [`Config`] — the few knobs a role adapter exposes. There is no
//! configuration file format; contexts are ephemeral and reconfigure by
//! reconstruction.

/// Configuration for a bus node.
///
/// ## Field semantics
/// - `queue_capacity`: inbound funnel size (min 1; clamped). Envelopes
///   arriving while the queue is full are dropped for this node only, with a
///   warning — peers and other nodes are unaffected.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the inbound envelope queue drained by the router task.
    ///
    /// Slow handlers cause the queue to fill; overflow drops the newest
    /// envelope for this node only. Minimum value is 1 (enforced by the
    /// clamped accessor).
    pub queue_capacity: usize,
}

impl Config {
    /// Returns the queue capacity clamped to a minimum of 1.
    ///
    /// The node uses this value to avoid constructing an invalid channel.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = Config { queue_capacity: 0 };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(Config::default().queue_capacity_clamped(), 1024);
    }
}
