//! # The generic bus node: one dispatcher, parameterized by role and wiring.
//!
//! [`Node`] is the single shared implementation behind every role adapter —
//! a tagged role plus injected [`Wiring`] instead of per-role subclassing.
//!
//! ## Architecture
//! ```text
//! transports (N)                       one router task
//!   link A ── on_receive ──┐
//!   link B ── on_receive ──┼──► [bounded queue] ──► dispatch_inbound()
//!   link C ── on_receive ──┘                          │
//!                                     ┌───────────────┴───────────────┐
//!                                     ▼                               ▼
//!                              addressed? → EventRegistry      unconsumed? →
//!                              handle_event (in order)         forward_links → send
//! ```
//!
//! ## Rules
//! - **Two-phase construction**: `new` builds the node; nothing can be
//!   dispatched until `activate()` claims the transports and spawns the
//!   router task. Subscribe between the two and no inbound event can be
//!   missed.
//! - **Sequential dispatch**: all inbound envelopes funnel into one queue
//!   drained by one task, so the subscription table sees one dispatch at a
//!   time.
//! - **Emit never loops back**: emission always goes through the transport,
//!   even when the sender and an eventual local subscriber share the table.
//! - **Overflow**: a full inbound queue drops the envelope for this node
//!   only, with a warning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::envelope::{self, Envelope, Payload};
use crate::error::BusError;
use crate::registry::EventRegistry;
use crate::routing::{self, Destination, Peer, Role, Sender, WorkerId};
use crate::transport::Transport;

use super::config::Config;
use super::wiring::{Link, Wiring};

struct Inbound {
    from: Peer,
    envelope: Envelope,
}

/// A single execution context's attachment to the bus.
///
/// Role adapters wrap this with addressing conveniences; the node itself
/// carries the subscription table, the wiring, and the routing loop.
pub struct Node {
    role: Role,
    worker_id: Option<WorkerId>,
    config: Config,
    registry: EventRegistry,
    wiring: RwLock<Wiring>,
    inbound: Mutex<Option<mpsc::Sender<Inbound>>>,
    router_task: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    active: AtomicBool,
}

impl Node {
    /// Creates an inactive node.
    ///
    /// `worker_id` must be `Some` iff `role` is [`Role::Worker`].
    pub fn new(role: Role, worker_id: Option<WorkerId>, config: Config, wiring: Wiring) -> Arc<Self> {
        Arc::new(Self {
            role,
            worker_id,
            config,
            registry: EventRegistry::new(),
            wiring: RwLock::new(wiring),
            inbound: Mutex::new(None),
            router_task: Mutex::new(None),
            cancel: CancellationToken::new(),
            active: AtomicBool::new(false),
        })
    }

    /// This node's role.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// True once `activate()` has run.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Registers a persistent handler. Returns self for chaining.
    pub fn on(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.registry.on(event, handler);
        self
    }

    /// Registers a one-shot handler. Returns self for chaining.
    pub fn once(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.registry.once(event, handler);
        self
    }

    /// The local subscription table.
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Serializes and emits an event toward `destination`
    /// (default: [`Destination::PASSTHROUGH`]).
    ///
    /// Local subscribers of this same node are **not** invoked directly;
    /// emission always goes through the transport, even if the transport
    /// loops back.
    ///
    /// Fails fast on a destination with no role bits — delivery-time silence
    /// would hide the bug.
    pub fn emit(
        &self,
        event: impl Into<String>,
        data: impl Serialize,
        destination: Option<Destination>,
    ) -> Result<(), BusError> {
        let destination = destination.unwrap_or(Destination::PASSTHROUGH);
        if !destination.has_role_bits() {
            return Err(BusError::EmptyDestination {
                mask: destination.bits(),
            });
        }

        let payload = serde_json::to_value(data)?;
        let env = Envelope::new(destination, envelope::serialize(event, payload));

        let wiring = self.wiring.read();
        let links = routing::outbound_links(self.role, &wiring, destination);
        tracing::trace!(
            role = self.role.as_label(),
            event = %env.data.event,
            links = links.len(),
            "emit"
        );
        for link in links {
            link.send(env.clone());
        }
        Ok(())
    }

    /// Attaches an additional link at runtime.
    ///
    /// If the node is already active the transport's inbound stream is
    /// claimed immediately; otherwise `activate()` will claim it.
    pub fn attach_link(&self, peer: Peer, transport: Arc<dyn Transport>) {
        let link = Link::new(peer, transport);
        if let Some(tx) = self.inbound.lock().as_ref() {
            self.claim_inbound(&link, tx);
        }
        self.wiring.write().add(link);
    }

    /// Claims every transport's inbound stream and spawns the router task.
    ///
    /// Until this is called no inbound dispatch is possible, which is what
    /// lets a caller finish registering `on`/`once` handlers synchronously
    /// after construction. Calling it twice is an error.
    pub fn activate(self: Arc<Self>) -> Result<(), BusError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(BusError::AlreadyActive);
        }

        let (tx, mut rx) = mpsc::channel::<Inbound>(self.config.queue_capacity_clamped());
        // Published before claiming so a concurrent attach_link can never
        // leave its transport unclaimed; a double claim is ignored by the
        // transport.
        *self.inbound.lock() = Some(tx.clone());
        {
            let wiring = self.wiring.read();
            for link in wiring.links() {
                self.claim_inbound(link, &tx);
            }
        }

        let me = Arc::clone(&self);
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(inbound) => me.dispatch_inbound(inbound.from, inbound.envelope),
                        None => break,
                    },
                }
            }
        });
        *self.router_task.lock() = Some(handle);
        Ok(())
    }

    /// Stops the router task and waits for it to finish.
    ///
    /// The envelope being dispatched (if any) completes; queued envelopes
    /// are discarded. The subscription table dies with the node.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.router_task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Funnels one transport's inbound stream into the router queue.
    fn claim_inbound(&self, link: &Link, tx: &mpsc::Sender<Inbound>) {
        let from = link.peer();
        let tx = tx.clone();
        let role = self.role.as_label();
        link.transport().on_receive(Box::new(move |envelope| {
            match tx.try_send(Inbound { from, envelope }) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(role, "inbound queue full; envelope dropped for this node");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(role, "node stopped; envelope dropped");
                }
            }
        }));
    }

    /// The per-envelope decision procedure (consume and/or relay).
    fn dispatch_inbound(&self, from: Peer, env: Envelope) {
        if !env.destination.has_role_bits() {
            tracing::debug!(
                role = self.role.as_label(),
                mask = env.destination.bits(),
                "malformed envelope dropped"
            );
            return;
        }

        let decision = routing::decide(self.role, self.worker_id, env.destination);

        if decision.deliver {
            let decoded = envelope::deserialize(env.data.clone());
            let sender = Sender {
                from: Some(from),
                worker_id: env
                    .destination
                    .is_worker()
                    .then(|| env.destination.worker_id()),
            };
            self.registry.handle_event(&decoded.kind, &decoded.data, &sender);
        }

        if decision.forward {
            let wiring = self.wiring.read();
            for link in routing::forward_links(self.role, &wiring, from, env.destination) {
                link.send(env.clone());
            }
        }
    }
}
