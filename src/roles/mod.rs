//! # Role adapters: thin per-role specializations of the generic node.
//!
//! Four adapters bind the one dispatcher implementation to the transports and
//! addressing conveniences available to each role.
//!
//! ## Topology
//! ```text
//!                       page link                 privileged link
//!  worker ──┐      ┌──────────────────┐      ┌─────────────────────┐
//!           ▼      ▼                  ▼      ▼                     ▼
//!       ContextBus ◄────────────► ContentBus ◄──────────────► BackgroundBus
//!           ▲                         ▲                         (one link
//!           └── owned workers ────────┘── owned workers            per tab)
//! ```
//!
//! Content is the only bridge between the page side and background; workers
//! hang off whichever role spawned them and are addressed via the worker
//! flag + id, never via a role bit.

mod background;
mod content;
mod context;
mod worker;

pub use background::{BackgroundBus, BackgroundBusBuilder};
pub use content::{ContentBus, ContentBusBuilder};
pub use context::{ContextBus, ContextBusBuilder};
pub use worker::WorkerBus;
