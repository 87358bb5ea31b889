//! # The per-context subscription table.

use std::collections::hash_map;
use std::collections::HashMap;
use std::panic;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::envelope::Payload;
use crate::routing::Sender;

use super::entry::{Entry, Handler, Slot};

/// Subscription table mapping event names to handlers.
///
/// Created when a role adapter is constructed, lives for the lifetime of that
/// execution context, discarded on teardown. There is no persistence across
/// context restarts.
///
/// Registration is cheap and lock-scoped; dispatch snapshots the entry list
/// so handlers may register further subscribers without corrupting the pass.
///
/// ### Example
/// ```rust
/// use relaybus::EventRegistry;
///
/// let registry = EventRegistry::new();
/// registry
///     .on("tick", |_data, _sender| {})
///     .once("ready", |_data, _sender| {});
/// assert_eq!(registry.handler_count("tick"), 1);
/// ```
#[derive(Default)]
pub struct EventRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

enum Pass {
    Single(Handler),
    SingleOnce(Handler),
    Many(Vec<Entry>),
}

enum Rebuild {
    Remove,
    Collapse(Entry),
    Keep,
}

impl EventRegistry {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a persistent handler. Returns self for chaining.
    ///
    /// There is no cap on subscriber count.
    pub fn on(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.insert(event.into(), Entry::Persistent(Arc::new(handler)));
        self
    }

    /// Registers a handler that fires exactly one time. Returns self for
    /// chaining.
    ///
    /// Within one dispatch pass every matching handler — once or persistent —
    /// fires exactly once, in registration order.
    pub fn once(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Payload, &Sender) + Send + Sync + 'static,
    ) -> &Self {
        self.insert(event.into(), Entry::OnceOnly(Arc::new(handler)));
        self
    }

    /// Number of event names with at least one registered handler.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// True if no handlers are registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        match self.slots.lock().get(event) {
            None => 0,
            Some(Slot::Single(_)) => 1,
            Some(Slot::Many(list)) => list.len(),
        }
    }

    /// True if `event` is stored in the unwrapped single-entry form.
    #[cfg(test)]
    pub(crate) fn is_single(&self, event: &str) -> bool {
        matches!(self.slots.lock().get(event), Some(Slot::Single(_)))
    }

    fn insert(&self, key: String, entry: Entry) {
        let mut slots = self.slots.lock();
        match slots.entry(key) {
            hash_map::Entry::Vacant(vac) => {
                vac.insert(Slot::Single(entry));
            }
            hash_map::Entry::Occupied(mut occ) => match occ.get_mut() {
                Slot::Many(list) => list.push(entry),
                Slot::Single(_) => {
                    // Upgrade lazily: the list exists only once a second
                    // subscriber shows up.
                    let old = std::mem::replace(occ.get_mut(), Slot::Many(Vec::with_capacity(2)));
                    if let (Slot::Many(list), Slot::Single(first)) = (occ.get_mut(), old) {
                        list.push(first);
                        list.push(entry);
                    }
                }
            },
        }
    }

    /// Dispatches a decoded event to the local subscribers.
    ///
    /// Entry point for the listener wiring; applications emit through the
    /// transport instead of calling this directly.
    pub(crate) fn handle_event(&self, event: &str, data: &Payload, sender: &Sender) {
        let pass = {
            let mut slots = self.slots.lock();
            let pass = match slots.get(event) {
                // Unregistered events are tolerated.
                None => return,
                Some(Slot::Single(Entry::Persistent(h))) => Pass::Single(h.clone()),
                Some(Slot::Single(Entry::OnceOnly(h))) => Pass::SingleOnce(h.clone()),
                Some(Slot::Many(list)) => Pass::Many(list.clone()),
            };
            if matches!(pass, Pass::SingleOnce(_)) {
                // Removed before invocation so the handler cannot fire twice
                // even if it triggers a re-entrant dispatch.
                slots.remove(event);
            }
            pass
        };

        match pass {
            // Fast path: one persistent handler, no bookkeeping.
            Pass::Single(h) | Pass::SingleOnce(h) => invoke(event, &h, data, sender),
            Pass::Many(entries) => {
                let mut fired: Vec<Handler> = Vec::new();
                for entry in &entries {
                    invoke(event, entry.handler(), data, sender);
                    if entry.is_once() {
                        fired.push(Arc::clone(entry.handler()));
                    }
                }
                if !fired.is_empty() {
                    self.remove_fired(event, &fired);
                }
            }
        }
    }

    /// Removes the one-shot entries that fired, by entry identity, then
    /// rebuilds storage: zero survivors deletes the key, one survivor is
    /// stored unwrapped, two-plus keep the list.
    fn remove_fired(&self, event: &str, fired: &[Handler]) {
        let mut slots = self.slots.lock();
        let rebuild = match slots.get_mut(event) {
            Some(Slot::Many(list)) => {
                list.retain(|e| {
                    !(e.is_once() && fired.iter().any(|f| Arc::ptr_eq(f, e.handler())))
                });
                match list.len() {
                    0 => Rebuild::Remove,
                    1 => match list.pop() {
                        Some(last) => Rebuild::Collapse(last),
                        None => Rebuild::Remove,
                    },
                    _ => Rebuild::Keep,
                }
            }
            _ => Rebuild::Keep,
        };
        match rebuild {
            Rebuild::Remove => {
                slots.remove(event);
            }
            Rebuild::Collapse(entry) => {
                slots.insert(event.to_string(), Slot::Single(entry));
            }
            Rebuild::Keep => {}
        }
    }
}

/// Invokes one handler with panic isolation so one subscriber cannot block
/// delivery to the next.
fn invoke(event: &str, handler: &Handler, data: &Payload, sender: &Sender) {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| handler(data, sender)));
    if result.is_err() {
        tracing::error!(event = %event, "subscriber panicked during dispatch; continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Sender;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn dispatch(registry: &EventRegistry, event: &str) {
        registry.handle_event(event, &json!(null), &Sender::default());
    }

    #[test]
    fn test_unregistered_event_is_a_no_op() {
        let registry = EventRegistry::new();
        dispatch(&registry, "nobody-home");
    }

    #[test]
    fn test_dispatch_order_matches_registration_order() {
        let registry = EventRegistry::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        for tag in ["a", "b", "c", "d"] {
            let order = Arc::clone(&order);
            registry.on("ev", move |_, _| order.lock().unwrap().push(tag));
        }

        dispatch(&registry, "ev");
        dispatch(&registry, "ev");
        assert_eq!(
            *order.lock().unwrap(),
            vec!["a", "b", "c", "d", "a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        registry.once("ev", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        dispatch(&registry, "ev");
        dispatch(&registry, "ev");
        dispatch(&registry, "ev");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.handler_count("ev"), 0);
    }

    #[test]
    fn test_mixed_table_retains_only_persistent() {
        let registry = EventRegistry::new();
        let hits = Arc::new(StdMutex::new(Vec::new()));

        let h = Arc::clone(&hits);
        registry.once("ev", move |_, _| h.lock().unwrap().push("once-1"));
        let h = Arc::clone(&hits);
        registry.on("ev", move |_, _| h.lock().unwrap().push("on"));
        let h = Arc::clone(&hits);
        registry.once("ev", move |_, _| h.lock().unwrap().push("once-2"));

        dispatch(&registry, "ev");
        dispatch(&registry, "ev");

        assert_eq!(
            *hits.lock().unwrap(),
            vec!["once-1", "on", "once-2", "on"],
            "one-shot handlers must fire on the first pass only"
        );
        assert_eq!(registry.handler_count("ev"), 1);
        assert!(registry.is_single("ev"), "single survivor must be unwrapped");
    }

    #[test]
    fn test_collapse_and_expand_preserve_behavior() {
        let registry = EventRegistry::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let o = Arc::clone(&order);
        registry.on("ev", move |_, _| o.lock().unwrap().push("first"));
        assert!(registry.is_single("ev"));

        let o = Arc::clone(&order);
        registry.once("ev", move |_, _| o.lock().unwrap().push("second"));
        assert!(!registry.is_single("ev"), "second subscriber upgrades to a list");

        dispatch(&registry, "ev");
        assert!(registry.is_single("ev"), "one survivor collapses back");

        dispatch(&registry, "ev");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_single_once_is_removed_before_invocation() {
        let registry = Arc::new(EventRegistry::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let r = Arc::clone(&registry);
        let s = Arc::clone(&seen);
        registry.once("ev", move |_, _| {
            // At this point the entry must already be gone.
            s.store(r.handler_count("ev"), Ordering::SeqCst);
        });

        dispatch(&registry, "ev");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_added_mid_pass_survives_but_does_not_fire() {
        let registry = Arc::new(EventRegistry::new());
        let count = Arc::new(AtomicUsize::new(0));

        // Two entries so dispatch takes the list path.
        let r = Arc::clone(&registry);
        let c = Arc::clone(&count);
        registry.once("ev", move |_, _| {
            let c2 = Arc::clone(&c);
            r.on("ev", move |_, _| {
                c2.fetch_add(1, Ordering::SeqCst);
            });
        });
        registry.on("ev", |_, _| {});

        dispatch(&registry, "ev");
        assert_eq!(
            count.load(Ordering::SeqCst),
            0,
            "mid-pass registration must not fire in the same pass"
        );
        assert_eq!(registry.handler_count("ev"), 2, "late entry must survive the rebuild");

        dispatch(&registry, "ev");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_does_not_block_the_next() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        registry.on("ev", |_, _| panic!("boom"));
        let c = Arc::clone(&count);
        registry.on("ev", move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        dispatch(&registry, "ev");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_payload_reaches_handlers() {
        let registry = EventRegistry::new();
        let got = Arc::new(StdMutex::new(json!(null)));

        let g = Arc::clone(&got);
        registry.on("ev", move |data, _| {
            *g.lock().unwrap() = data.clone();
        });

        registry.handle_event("ev", &json!({"n": 7}), &Sender::default());
        assert_eq!(*got.lock().unwrap(), json!({"n": 7}));
    }
}
