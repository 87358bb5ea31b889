//! # relaybus
//!
//! **Relaybus** is a typed, bidirectional event bus for isolated execution
//! contexts — a privileged background process, sandboxed content scripts, an
//! untrusted page context, and optional worker threads — exchanging
//! structured events without any context knowing how the others are
//! physically reached.
//!
//! The crate is the **addressing and routing protocol**: how an envelope is
//! tagged with its destination(s), how each context decides whether to
//! consume and/or relay it, and how per-event subscriber lists are managed.
//! The transports that move bytes between contexts are injected
//! collaborators implementing [`Transport`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   emit("ev", data, dst)                 page link                  privileged link
//! ┌─────────────────┐            ┌──────────────────────┐         ┌──────────────────┐
//! │   ContextBus    │◄──────────►│      ContentBus      │◄───────►│  BackgroundBus   │
//! │  (page context) │            │  (the only bridge)   │         │ (one link / tab) │
//! └───────┬─────────┘            └──────────┬───────────┘         └──────────────────┘
//!         │ owned workers                   │ owned workers
//!         ▼                                 ▼
//!   ┌───────────┐                     ┌───────────┐
//!   │ WorkerBus │                     │ WorkerBus │   addressed via worker flag + id,
//!   └───────────┘                     └───────────┘   reachable only through the owner
//! ```
//!
//! ### Per-envelope decision (every receive)
//! ```text
//! raw envelope ──► well-formed? ──no──► drop (silent)
//!       │yes
//!       ▼
//! addressed to me? ──yes──► EventRegistry::handle_event (registration order)
//!       │                          │
//!       │no                        ▼
//!       │                  fully consumed? (single-role target: yes,
//!       │                  passthrough: never)
//!       ▼                          │no
//! forward on every outward link that can still reach a destination,
//! never back down the link the envelope arrived on
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types                              |
//! |-----------------|---------------------------------------------------------|----------------------------------------|
//! | **Addressing**  | Compact role bitmask + worker flag/id field.            | [`Destination`], [`Role`], [`WorkerId`]|
//! | **Envelopes**   | The wire record every transport carries verbatim.       | [`Envelope`], [`WireEvent`]            |
//! | **Subscribing** | Persistent and one-shot handlers, registration order.   | [`EventRegistry`]                      |
//! | **Routing**     | Consume/relay decisions with echo prevention.           | [`Node`], [`Wiring`], [`Peer`]         |
//! | **Role adapters**| Thin per-role conveniences (`emit_background`, ...).   | [`BackgroundBus`], [`ContentBus`], [`ContextBus`], [`WorkerBus`] |
//! | **Transports**  | Injected collaborators; in-process pipe included.       | [`Transport`], [`Pipe`]                |
//! | **Errors**      | Fail-fast emit invariants, typed.                       | [`BusError`]                           |
//!
//! ## Ordering guarantee
//! Construction is two-phase: build an adapter, register `on`/`once`
//! handlers synchronously, then call `activate()`. No inbound dispatch is
//! possible before activation, and the bundled [`Pipe`] buffers envelopes
//! sent before the far end activates — so the construct → subscribe →
//! first-dispatch ordering is preserved without relying on task-queue
//! timing.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use relaybus::{BackgroundBus, Config, ContentBus, Pipe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One tab: background ↔ content over an in-process pipe.
//!     let (background_end, content_end) = Pipe::duplex();
//!
//!     let background = BackgroundBus::builder(Config::default())
//!         .tab(Arc::new(background_end))
//!         .build();
//!     let content = ContentBus::builder(Config::default())
//!         .background(Arc::new(content_end))
//!         .build();
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     background.on("hello", move |data, _sender| {
//!         let _ = tx.send(data.clone());
//!     });
//!
//!     background.activate()?;
//!     content.activate()?;
//!
//!     content.emit_background("hello", serde_json::json!({"from": "content"}))?;
//!
//!     let payload = rx.recv().await.expect("delivery");
//!     assert_eq!(payload["from"], "content");
//!     Ok(())
//! }
//! ```

mod core;
mod envelope;
mod error;
mod registry;
mod roles;
mod routing;
mod transport;

// ---- Public re-exports ----

pub use crate::core::{Config, Link, Node, Wiring};
pub use crate::envelope::{deserialize, serialize, Decoded, Envelope, Payload, WireEvent};
pub use crate::error::BusError;
pub use crate::registry::EventRegistry;
pub use crate::roles::{
    BackgroundBus, BackgroundBusBuilder, ContentBus, ContentBusBuilder, ContextBus,
    ContextBusBuilder, WorkerBus,
};
pub use crate::routing::{Destination, Peer, Role, Sender, WorkerId, WORKER_FLAG, WORKER_ID_MASK};
pub use crate::transport::{InboundHandler, Pipe, PipeEnd, Transport};
