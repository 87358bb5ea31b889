//! Wire-level event model.
//!
//! This module groups the envelope **data model**: the addressed record every
//! transport carries verbatim, and the identity serialize/deserialize pair
//! that pins down the wire field names so every role agrees on them.
//!
//! ## Contents
//! - [`WireEvent`], [`Decoded`], [`serialize`], [`deserialize`] — the
//!   name + payload record and its two representations
//! - [`Envelope`] — destination mask + wire event, the unit of transport
//!
//! ## Wire shape (bit-exact)
//! ```text
//! { "destination": <u16 bitmask>, "data": { "event": <string>, "data": <payload> } }
//! ```

mod envelope;
mod wire;

pub use envelope::Envelope;
pub use wire::{deserialize, serialize, Decoded, Payload, WireEvent};
