//! Subscription entries: the tagged handler union and its storage slot.

use std::sync::Arc;

use crate::envelope::Payload;
use crate::routing::Sender;

/// Shared handler closure. Receives the payload and the immediate sender.
pub(crate) type Handler = Arc<dyn Fn(&Payload, &Sender) + Send + Sync>;

/// One registered subscriber.
#[derive(Clone)]
pub(crate) enum Entry {
    /// Fires on every matching dispatch.
    Persistent(Handler),
    /// Fires exactly once, then is removed.
    OnceOnly(Handler),
}

impl Entry {
    #[inline]
    pub(crate) fn handler(&self) -> &Handler {
        match self {
            Entry::Persistent(h) | Entry::OnceOnly(h) => h,
        }
    }

    #[inline]
    pub(crate) fn is_once(&self) -> bool {
        matches!(self, Entry::OnceOnly(_))
    }
}

/// Storage for one event name.
///
/// `Many` is allocated lazily only once a second subscriber is added, and
/// collapsed back to `Single` when only one entry remains.
pub(crate) enum Slot {
    Single(Entry),
    Many(Vec<Entry>),
}
