//! # Content role adapter.
//!
//! The content script is the only bridge between the page context and the
//! background process: it holds the page link, the (optional) privileged
//! background link, and links to any workers it spawned.

use std::sync::Arc;

use serde::Serialize;

use crate::core::{Config, Node, Wiring};
use crate::envelope::Payload;
use crate::error::BusError;
use crate::routing::{Destination, Peer, Role, Sender, WorkerId};
use crate::transport::Transport;

/// Bus attachment for the content role.
pub struct ContentBus {
    node: Arc<Node>,
}

impl ContentBus {
    /// Starts building a content adapter.
    pub fn builder(config: Config) -> ContentBusBuilder {
        ContentBusBuilder {
            config,
            page: None,
            background: None,
            workers: Vec::new(),
        }
    }

    /// Attaches a link to a newly spawned worker at runtime.
    pub fn attach_worker(&self, id: WorkerId, transport: Arc<dyn Transport>) {
        self.node.attach_link(Peer::Worker(id), transport);
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
    pub fn emit(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), BusError> {
        self.node.emit(event, data, None)
    }

    /// Emits toward an explicit destination.
    pub fn emit_to(
        &self,
        event: impl Into<String>,
        data: impl Serialize,
        destination: Destination,
    ) -> Result<(), BusError> {
        self.node.emit(event, data, Some(destination))
    }

    /// Emits toward the background role.
    pub fn emit_background(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), BusError> {
        self.emit_to(event, data, Destination::BACKGROUND)
    }

    /// Emits toward the page context.
    pub fn emit_context(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), BusError> {
        self.emit_to(event, data, Destination::CONTEXT)
    }

    /// Claims the transports and starts dispatching. See [`Node::activate`].
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

/// Builder for [`ContentBus`].
pub struct ContentBusBuilder {
    config: Config,
    page: Option<Arc<dyn Transport>>,
    background: Option<Arc<dyn Transport>>,
    workers: Vec<(WorkerId, Arc<dyn Transport>)>,
}

impl ContentBusBuilder {
    /// Sets the page link (toward the page context).
    #[must_use]
    pub fn page(mut self, transport: Arc<dyn Transport>) -> Self {
        self.page = Some(transport);
        self
    }

    /// Sets the privileged background link.
    ///
    /// When absent (no privileged messaging available), background-addressed
    /// traffic is skipped rather than raising.
    #[must_use]
    pub fn background(mut self, transport: Arc<dyn Transport>) -> Self {
        self.background = Some(transport);
        self
    }

    /// Adds a link to an owned worker.
    #[must_use]
    pub fn worker(mut self, id: WorkerId, transport: Arc<dyn Transport>) -> Self {
        self.workers.push((id, transport));
        self
    }

    /// Builds the inactive adapter.
    pub fn build(self) -> ContentBus {
        let mut wiring = Wiring::new();
        if let Some(page) = self.page {
            wiring = wiring.with_link(Peer::Context, page);
        }
        if let Some(background) = self.background {
            wiring = wiring.with_link(Peer::Background, background);
        }
        for (id, transport) in self.workers {
            wiring = wiring.with_link(Peer::Worker(id), transport);
        }
        ContentBus {
            node: Node::new(Role::Content, None, self.config, wiring),
        }
    }
}
