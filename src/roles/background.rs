//! # Background role adapter.
//!
//! The privileged background process reaches content scripts only — one link
//! per tab — and fans every emission out to all of them; content bridges
//! onward to the page context and workers.

use std::sync::Arc;

use serde::Serialize;

use crate::core::{Config, Node, Wiring};
use crate::envelope::Payload;
use crate::error::BusError;
use crate::routing::{Destination, Peer, Role, Sender};
use crate::transport::Transport;

/// Bus attachment for the background role.
///
/// ### Example
/// ```no_run
/// use relaybus::{BackgroundBus, Config};
///
/// let background = BackgroundBus::builder(Config::default()).build();
/// background.on("tab-ready", |data, _sender| {
///     let _ = data;
/// });
/// // activate() requires a running tokio runtime:
/// // background.activate()?;
/// ```
pub struct BackgroundBus {
    node: Arc<Node>,
}

impl BackgroundBus {
    /// Starts building a background adapter.
    pub fn builder(config: Config) -> BackgroundBusBuilder {
        BackgroundBusBuilder {
            config,
            tabs: Vec::new(),
        }
    }

    /// Attaches another content link (a newly opened tab) at runtime.
    pub fn attach_tab(&self, transport: Arc<dyn Transport>) {
        self.node.attach_link(Peer::Content, transport);
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

    /// Emits toward the content role.
    pub fn emit_content(&self, event: impl Into<String>, data: impl Serialize) -> Result<(), BusError> {
        self.emit_to(event, data, Destination::CONTENT)
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

/// Builder for [`BackgroundBus`].
pub struct BackgroundBusBuilder {
    config: Config,
    tabs: Vec<Arc<dyn Transport>>,
}

impl BackgroundBusBuilder {
    /// Adds a content link (one per reachable tab).
    #[must_use]
    pub fn tab(mut self, transport: Arc<dyn Transport>) -> Self {
        self.tabs.push(transport);
        self
    }

    /// Builds the inactive adapter.
    pub fn build(self) -> BackgroundBus {
        let mut wiring = Wiring::new();
        for tab in self.tabs {
            wiring = wiring.with_link(Peer::Content, tab);
        }
        BackgroundBus {
            node: Node::new(Role::Background, None, self.config, wiring),
        }
    }
}
