//! # In-process duplex transport.
//!
//! [`Pipe::duplex`] returns two connected [`PipeEnd`]s over unbounded tokio
//! channels. Whatever one end sends, the other end's inbound handler
//! receives, in order.
//!
//! ## Properties
//! - **Buffering**: sends enqueue even before the receiving side registers
//!   its handler, so the construct → subscribe → activate ordering loses
//!   nothing.
//! - **Fire-and-forget**: sending into a closed peer drops the envelope
//!   silently (traced at debug level).
//! - **One receiver**: the inbound stream can be claimed once; later
//!   registrations are ignored with a warning.

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::envelope::Envelope;

use super::{InboundHandler, Transport};

/// Factory for connected in-process transport pairs.
pub struct Pipe;

impl Pipe {
    /// Creates two connected ends; envelopes sent on one arrive at the other.
    pub fn duplex() -> (PipeEnd, PipeEnd) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            PipeEnd {
                tx: a_tx,
                rx: Mutex::new(Some(b_rx)),
            },
            PipeEnd {
                tx: b_tx,
                rx: Mutex::new(Some(a_rx)),
            },
        )
    }
}

/// One end of an in-process duplex pair.
pub struct PipeEnd {
    tx: mpsc::UnboundedSender<Envelope>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
}

impl Transport for PipeEnd {
    fn send(&self, envelope: Envelope) {
        if self.tx.send(envelope).is_err() {
            tracing::debug!("pipe peer closed; envelope dropped");
        }
    }

    /// Claims the inbound stream and drains it on a spawned task.
    ///
    /// Must be called within a tokio runtime.
    fn on_receive(&self, handler: InboundHandler) {
        let Some(mut rx) = self.rx.lock().take() else {
            tracing::warn!("pipe inbound handler already registered; ignoring");
            return;
        };
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                handler(envelope);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::serialize;
    use crate::routing::Destination;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc as test_mpsc;

    fn envelope(n: i64) -> Envelope {
        Envelope::new(Destination::CONTENT, serialize("n", json!(n)))
    }

    #[tokio::test]
    async fn test_send_reaches_the_other_end_in_order() {
        let (a, b) = Pipe::duplex();
        let (tx, mut rx) = test_mpsc::unbounded_channel();

        b.on_receive(Box::new(move |env| {
            let _ = tx.send(env);
        }));

        a.send(envelope(1));
        a.send(envelope(2));

        assert_eq!(rx.recv().await.unwrap(), envelope(1));
        assert_eq!(rx.recv().await.unwrap(), envelope(2));
    }

    #[tokio::test]
    async fn test_sends_before_registration_are_buffered() {
        let (a, b) = Pipe::duplex();
        a.send(envelope(7));

        let (tx, mut rx) = test_mpsc::unbounded_channel();
        b.on_receive(Box::new(move |env| {
            let _ = tx.send(env);
        }));

        assert_eq!(rx.recv().await.unwrap(), envelope(7));
    }

    #[tokio::test]
    async fn test_send_to_dropped_peer_is_silent() {
        let (a, b) = Pipe::duplex();
        drop(b);
        a.send(envelope(1));
    }

    #[tokio::test]
    async fn test_second_registration_is_ignored() {
        let (a, b) = Pipe::duplex();
        let b = Arc::new(b);

        let (tx, mut rx) = test_mpsc::unbounded_channel();
        b.on_receive(Box::new(move |env| {
            let _ = tx.send(env);
        }));
        // Second claim must not steal the stream.
        b.on_receive(Box::new(|_| panic!("second handler must never run")));

        a.send(envelope(3));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(rx.recv().await.unwrap(), envelope(3));
    }
}
