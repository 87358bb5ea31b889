//! # Event subscription table and local dispatcher.
//!
//! This module provides [`EventRegistry`], the generic, role-agnostic table
//! mapping event names to handlers. Every role adapter owns exactly one.
//!
//! ## Architecture
//! ```text
//! on(k, f) / once(k, f)
//!     │
//!     ▼
//! ┌───────────────────────────────────────────────┐
//! │ slots: { k → Single(entry) | Many([entries]) }│ ◄── handle_event(k, payload)
//! └───────────────────────────────────────────────┘        │
//!        Many allocated lazily on the second               ▼
//!        subscriber, collapsed back to Single       handlers fire in
//!        when one survivor remains                  registration order
//! ```
//!
//! ## Rules
//! - Dispatch order matches registration order, on every matching dispatch.
//! - A one-shot entry fires exactly once, then is removed.
//! - An unregistered event name is a legitimate no-op, never an error.
//! - A panicking handler is isolated; the remaining handlers still fire.
//! - Handlers registered mid-pass are not invoked in that pass but survive it.

mod entry;
mod registry;

pub use registry::EventRegistry;
