//! # Destination bitmask encoding.
//!
//! A [`Destination`] is a compact `u16` bitmask naming which role(s) an
//! envelope targets:
//!
//! ```text
//!  bit 15        bits 8..=14      bits 3..=7   bits 0..=2
//! ┌────────────┬────────────────┬────────────┬─────────────────────────┐
//! │ worker flag│   worker id    │  (unused)  │ Background Content Ctx  │
//! └────────────┴────────────────┴────────────┴─────────────────────────┘
//! ```
//!
//! - Role bits 0–2 are exclusively role flags; [`Destination::PASSTHROUGH`]
//!   is all three set and means "broadcast to every role".
//! - The worker flag marks "this targets a specific worker, not the owning
//!   role generically". A worker-targeted mask carries the owning role's bit
//!   ORed with the flag and the 7-bit id field.
//!
//! All predicates are pure, total functions over any `u16`: a malformed mask
//! simply tests false for every role, which callers treat as "undeliverable,
//! drop". The one invariant — a destination must name at least one role — is
//! enforced on the emit path, not here.
//!
//! # Example
//! ```rust
//! use relaybus::Destination;
//!
//! let d = Destination::CONTENT | Destination::BACKGROUND;
//! assert!(d.is_content());
//! assert!(d.is_background());
//! assert!(!d.is_context());
//! assert!(!d.is_passthrough());
//!
//! let w = Destination::CONTEXT.with_worker(5);
//! assert!(w.is_worker());
//! assert_eq!(w.worker_id(), 5);
//! ```

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// High flag bit marking "targets a specific worker".
pub const WORKER_FLAG: u16 = 0b1000_0000_0000_0000;

/// Field holding the worker id, extracted by `(mask & WORKER_ID_MASK) >> 8`.
pub const WORKER_ID_MASK: u16 = 0b0111_1111_0000_0000;

const WORKER_ID_SHIFT: u16 = 8;
const ROLE_MASK: u16 = 0b111;

/// Identifier of a worker thread, 0..=127 (7 bits on the wire).
pub type WorkerId = u8;

/// Bitmask naming which role(s) an envelope targets.
///
/// Serializes transparently as the raw integer so the wire shape stays
/// bit-exact across transports.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(u16);

impl Destination {
    /// The untrusted page context.
    pub const CONTEXT: Destination = Destination(0b001);
    /// A sandboxed content script.
    pub const CONTENT: Destination = Destination(0b010);
    /// The privileged background process.
    pub const BACKGROUND: Destination = Destination(0b100);
    /// Broadcast to all three roles.
    pub const PASSTHROUGH: Destination = Destination(0b111);

    /// Wraps a raw mask without validation.
    ///
    /// Any integer is accepted; malformed masks test false for every role.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw mask.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns a mask targeting a specific worker owned by `self`'s role.
    ///
    /// Keeps the role bits of `self`, sets the worker flag and stores the id
    /// (masked to 7 bits) in the id field.
    #[inline]
    pub const fn with_worker(self, id: WorkerId) -> Self {
        Self((self.0 & ROLE_MASK) | WORKER_FLAG | (((id & 0x7f) as u16) << WORKER_ID_SHIFT))
    }

    /// True if the Context role bit is set.
    #[inline]
    pub const fn is_context(self) -> bool {
        self.0 & Self::CONTEXT.0 != 0
    }

    /// True if the Content role bit is set.
    #[inline]
    pub const fn is_content(self) -> bool {
        self.0 & Self::CONTENT.0 != 0
    }

    /// True if the Background role bit is set.
    #[inline]
    pub const fn is_background(self) -> bool {
        self.0 & Self::BACKGROUND.0 != 0
    }

    /// True iff all three role bits are set.
    ///
    /// Not to be confused with "addressed to me", which is a single-bit test.
    #[inline]
    pub const fn is_passthrough(self) -> bool {
        self.0 & Self::PASSTHROUGH.0 == Self::PASSTHROUGH.0
    }

    /// True if the worker flag is set.
    #[inline]
    pub const fn is_worker(self) -> bool {
        self.0 & WORKER_FLAG != 0
    }

    /// Extracts the worker id field.
    ///
    /// Only meaningful when [`is_worker`](Self::is_worker) holds; for plain
    /// role masks this returns 0.
    #[inline]
    pub const fn worker_id(self) -> WorkerId {
        ((self.0 & WORKER_ID_MASK) >> WORKER_ID_SHIFT) as WorkerId
    }

    /// True if at least one role bit is set.
    ///
    /// A mask violating this is undeliverable; `emit` rejects it and the
    /// receive path drops it.
    #[inline]
    pub const fn has_role_bits(self) -> bool {
        self.0 & ROLE_MASK != 0
    }
}

impl BitOr for Destination {
    type Output = Destination;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Destination(self.0 | rhs.0)
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Destination({:#018b})", self.0)
    }
}

/// One of the four execution-context kinds participating in the bus.
///
/// The three addressable roles map to single destination bits; workers are
/// addressed via the worker flag + id field instead of a role bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Untrusted page context.
    Context,
    /// Sandboxed content script.
    Content,
    /// Privileged background process.
    Background,
    /// Worker thread owned by content or context.
    Worker,
}

impl Role {
    /// Returns the destination bit for this role (`0` for `Worker`).
    #[inline]
    pub(crate) const fn bit(self) -> u16 {
        match self {
            Role::Context => Destination::CONTEXT.0,
            Role::Content => Destination::CONTENT.0,
            Role::Background => Destination::BACKGROUND.0,
            Role::Worker => 0,
        }
    }

    /// Returns a short stable label for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Role::Context => "context",
            Role::Content => "content",
            Role::Background => "background",
            Role::Worker => "worker",
        }
    }
}
