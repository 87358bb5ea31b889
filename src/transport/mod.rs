//! # Transport collaborators.
//!
//! The core never moves bytes itself. Each role is wired to zero or more
//! transports — the concrete primitives that physically carry an envelope to
//! another context (a broadcast-postMessage-like channel, an
//! extension-runtime channel, a worker port). The core only requires the two
//! operations on [`Transport`]; the collaborator is responsible for actually
//! delivering.
//!
//! ## Rules
//! - [`Transport::send`] is fire-and-forget: no acknowledgment, no response
//!   channel, no error. A dead transport drops the envelope.
//! - [`Transport::on_receive`] registers the single raw inbound handler.
//!   Implementations should buffer envelopes that arrive before the handler
//!   is claimed so nothing is lost across the activation boundary.
//!
//! [`Pipe`] provides the in-process implementation used by tests and
//! single-process deployments.

mod pipe;

pub use pipe::{Pipe, PipeEnd};

use crate::envelope::Envelope;

/// Raw inbound handler registered by the wiring layer.
pub type InboundHandler = Box<dyn Fn(Envelope) + Send + Sync>;

/// A one-directional pair of operations over some concrete channel.
///
/// Implementations carry the envelope verbatim; the destination mask decides
/// consumption and relaying at the far end, not the transport.
pub trait Transport: Send + Sync + 'static {
    /// Sends an envelope toward the peer context. Fire-and-forget.
    fn send(&self, envelope: Envelope);

    /// Registers the inbound handler for envelopes arriving from the peer.
    ///
    /// Called once, at node activation. Registering twice is allowed to be a
    /// no-op.
    fn on_receive(&self, handler: InboundHandler);
}
