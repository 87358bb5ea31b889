//! # Worker role adapter.
//!
//! A worker cannot talk to other roles directly: it has exactly one link, to
//! the role that spawned it, and every outbound envelope is re-emitted one
//! level up through that link. Inbound, it consumes only envelopes carrying
//! the worker flag and its own id.

use std::sync::Arc;

use serde::Serialize;

use crate::core::{Config, Node, Wiring};
use crate::envelope::Payload;
use crate::error::BusError;
use crate::routing::{Destination, Peer, Role, Sender, WorkerId};
use crate::transport::Transport;

/// Bus attachment for a worker thread.
pub struct WorkerBus {
    node: Arc<Node>,
}

impl WorkerBus {
    /// Creates a worker adapter with the given id and its single owner link.
    ///
    /// `owner` is the role on the far end — [`Peer::Content`] or
    /// [`Peer::Context`], depending on who spawned the worker.
    pub fn new(config: Config, id: WorkerId, owner: Peer, transport: Arc<dyn Transport>) -> Self {
        let wiring = Wiring::new().with_link(owner, transport);
        Self {
            node: Node::new(Role::Worker, Some(id), config, wiring),
        }
    }

    /// Registers a persistent handler. Returns self for chaining.
    pub fn on(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.node.on(event, handler);
        self
    }

    /// Registers a one-shot handler. Returns self for chaining.
    pub fn once(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.node.once(event, handler);
        self
    }

    /// Emits to every role ([`Destination::PASSTHROUGH`]).
    ///
    /// Always travels up the owner link; the owner routes onward.
    pub fn emit(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), BusError> {
        self.node.emit(event, data, None)
    }

    /// Emits toward an explicit destination, via the owner link.
    pub fn emit_to(
        &self,
        event: impl Into<String>,
        data: impl Serialize,
        destination: Destination,
    ) -> Result<(), BusError> {
        self.node.emit(event, data, Some(destination))
    }

    /// Claims the transport and starts dispatching. See [`Node::activate`].
    pub fn activate(&self) -> Result<(), BusError> {
        Arc::clone(&self.node).activate()
    }

    /// Stops dispatching. See [`Node::shutdown`].
    pub async fn shutdown(&self) {
        self.node.shutdown().await;
    }

    /// The underlying generic node.
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }
}
