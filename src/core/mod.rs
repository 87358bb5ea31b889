//! Runtime core: the generic dispatcher node and its wiring.
//!
//! This module contains the one shared implementation behind every role
//! adapter. The public API from here is [`Node`], [`Wiring`]/[`Link`] and
//! [`Config`]; the per-role addressing conveniences live in `roles/`.
//!
//! Modules:
//! - [`config`]: node configuration (inbound queue sizing);
//! - [`wiring`]: injected transport handles with peer identities;
//! - [`node`]: subscription table + router task + two-phase activation.

mod config;
mod node;
mod wiring;

pub use config::Config;
pub use node::Node;
pub use wiring::{Link, Wiring};
