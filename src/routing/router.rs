//! # Per-envelope routing decisions.
//!
//! The "protocol" is not a state machine over time; it is a decision
//! procedure executed once per envelope, twice over:
//!
//! - [`outbound_links`] — the send path: which links an emitting role uses to
//!   move an envelope toward its destination.
//! - [`decide`] + [`forward_links`] — the receive path: whether the current
//!   role consumes the envelope locally, and which links relay the rest.
//!
//! ## Rules
//! - Content is the only bridge between the page context and background; it
//!   relays both directions, never back down the link an envelope arrived on.
//! - A worker is reachable only through its owning role; worker outbound
//!   always goes one level up through the single owner link.
//! - Background and context never relay on behalf of each other except
//!   through content; background never relays tab-to-tab.
//! - A link that is absent in the current wiring is skipped, never an error —
//!   the remaining destinations still receive the envelope.

use crate::core::{Link, Wiring};

use super::destination::{Destination, Role, WorkerId};

/// Identity of the party on the far end of a link — the immediate sender
/// tag carried by every relay so no link echoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    /// The page context side of a link.
    Context,
    /// The content script side of a link.
    Content,
    /// The background process side of a link.
    Background,
    /// A specific worker, by id.
    Worker(WorkerId),
}

impl Peer {
    /// The role kind on the far end.
    pub fn role(self) -> Role {
        match self {
            Peer::Context => Role::Context,
            Peer::Content => Role::Content,
            Peer::Background => Role::Background,
            Peer::Worker(_) => Role::Worker,
        }
    }
}

/// Delivery metadata handed to subscribers alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sender {
    /// The link the envelope arrived on, if any.
    pub from: Option<Peer>,
    /// The worker id field of the destination, when worker-targeted.
    pub worker_id: Option<WorkerId>,
}

/// Outcome of the receive-path decision for one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    /// Deliver to the local subscription table.
    pub deliver: bool,
    /// Relay onward; false once a single-role target has been consumed.
    pub forward: bool,
}

/// Computes "am I addressed?" and "is the envelope fully consumed here?".
///
/// A worker tests the worker flag plus its own id; every other role tests its
/// single role bit — and the absence of the worker flag, since a
/// worker-targeted envelope is not for the owning role generically. A
/// passthrough envelope is never fully consumed: it is meant for every role.
pub(crate) fn decide(
    role: Role,
    own_worker_id: Option<WorkerId>,
    destination: Destination,
) -> Decision {
    let addressed = match role {
        Role::Worker => {
            destination.is_worker() && own_worker_id == Some(destination.worker_id())
        }
        other => destination.bits() & other.bit() != 0 && !destination.is_worker(),
    };
    let consumed = addressed && !destination.is_passthrough();
    Decision {
        deliver: addressed,
        forward: !consumed,
    }
}

/// Picks the links an emitting role sends a fresh envelope on.
pub(crate) fn outbound_links<'a>(
    role: Role,
    wiring: &'a Wiring,
    destination: Destination,
) -> Vec<&'a Link> {
    match role {
        // Background fans out to every tab unconditionally; content bridges
        // onward from there.
        Role::Background => wiring.links_to_role(Role::Content).collect(),
        Role::Content => {
            let mut out = Vec::new();
            if destination.is_worker() && destination.is_content() {
                if let Some(link) = wiring.worker_link(destination.worker_id()) {
                    out.push(link);
                }
            }
            if destination.is_context() {
                if let Some(link) = wiring.link_to_role(Role::Context) {
                    out.push(link);
                }
            }
            if destination.is_background() {
                if let Some(link) = wiring.link_to_role(Role::Background) {
                    out.push(link);
                }
            }
            out
        }
        Role::Context => {
            if destination.is_worker() && destination.is_context() {
                if let Some(link) = wiring.worker_link(destination.worker_id()) {
                    return vec![link];
                }
            }
            // Everything else rides the page link; content bridges onward.
            wiring.link_to_role(Role::Content).into_iter().collect()
        }
        // A worker has exactly one link: its owner.
        Role::Worker => wiring.links().iter().collect(),
    }
}

/// Picks the links an unconsumed inbound envelope is relayed on.
///
/// `from` is the immediate sender; a relay never goes back down the link the
/// envelope just arrived on.
pub(crate) fn forward_links<'a>(
    role: Role,
    wiring: &'a Wiring,
    from: Peer,
    destination: Destination,
) -> Vec<&'a Link> {
    let mut out = Vec::new();

    // Worker fan-out at the owning role: owner bit matches, id is hosted here.
    if destination.is_worker() && destination.bits() & role.bit() != 0 {
        if let Some(link) = wiring.worker_link(destination.worker_id()) {
            if from != Peer::Worker(destination.worker_id()) {
                out.push(link);
            }
        }
    }

    match role {
        Role::Content => {
            if destination.is_context() && from.role() != Role::Context {
                if let Some(link) = wiring.link_to_role(Role::Context) {
                    out.push(link);
                }
            }
            if destination.is_background() && from.role() != Role::Background {
                if let Some(link) = wiring.link_to_role(Role::Background) {
                    out.push(link);
                }
            }
        }
        Role::Context => {
            // Only worker-originated traffic is re-emitted up the page link.
            if matches!(from, Peer::Worker(_))
                && (destination.is_content() || destination.is_background())
            {
                if let Some(link) = wiring.link_to_role(Role::Content) {
                    out.push(link);
                }
            }
        }
        Role::Background => {
            // Worker-originated traffic addressed beyond background fans out
            // to the tabs; nothing else is relayed (no tab-to-tab).
            if matches!(from, Peer::Worker(_))
                && (destination.is_content() || destination.is_context())
            {
                out.extend(wiring.links_to_role(Role::Content));
            }
        }
        Role::Worker => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::transport::Transport;
    use std::sync::Arc;

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, _envelope: Envelope) {}
        fn on_receive(&self, _handler: crate::transport::InboundHandler) {}
    }

    fn link(peer: Peer) -> Link {
        Link::new(peer, Arc::new(NullTransport))
    }

    fn peers(links: Vec<&Link>) -> Vec<Peer> {
        links.into_iter().map(Link::peer).collect()
    }

    fn content_wiring() -> Wiring {
        let mut wiring = Wiring::new();
        wiring.add(link(Peer::Context));
        wiring.add(link(Peer::Background));
        wiring.add(link(Peer::Worker(5)));
        wiring
    }

    #[test]
    fn test_decide_single_bit_targets() {
        let d = decide(Role::Context, None, Destination::CONTEXT);
        assert!(d.deliver);
        assert!(!d.forward, "single-role target is fully consumed on delivery");

        let d = decide(Role::Content, None, Destination::CONTEXT);
        assert!(!d.deliver);
        assert!(d.forward);
    }

    #[test]
    fn test_decide_passthrough_is_never_consumed() {
        for role in [Role::Context, Role::Content, Role::Background] {
            let d = decide(role, None, Destination::PASSTHROUGH);
            assert!(d.deliver, "{} must deliver passthrough", role.as_label());
            assert!(d.forward, "{} must still relay passthrough", role.as_label());
        }
    }

    #[test]
    fn test_decide_worker_flag_excludes_owner_role() {
        let dst = Destination::CONTENT.with_worker(5);
        let d = decide(Role::Content, None, dst);
        assert!(!d.deliver, "worker-targeted envelope is not for the owner generically");
        assert!(d.forward);
    }

    #[test]
    fn test_decide_worker_id_must_match() {
        let dst = Destination::CONTENT.with_worker(5);
        let d = decide(Role::Worker, Some(5), dst);
        assert!(d.deliver);
        assert!(!d.forward);

        let d = decide(Role::Worker, Some(6), dst);
        assert!(!d.deliver);
    }

    #[test]
    fn test_content_outbound_splits_by_destination() {
        let wiring = content_wiring();

        let out = peers(outbound_links(Role::Content, &wiring, Destination::BACKGROUND));
        assert_eq!(out, vec![Peer::Background]);

        let out = peers(outbound_links(Role::Content, &wiring, Destination::PASSTHROUGH));
        assert_eq!(out, vec![Peer::Context, Peer::Background]);

        let out = peers(outbound_links(
            Role::Content,
            &wiring,
            Destination::CONTENT.with_worker(5),
        ));
        assert_eq!(out, vec![Peer::Worker(5)]);

        // Context-owned worker: rides the page link toward its owner.
        let out = peers(outbound_links(
            Role::Content,
            &wiring,
            Destination::CONTEXT.with_worker(2),
        ));
        assert_eq!(out, vec![Peer::Context]);
    }

    #[test]
    fn test_missing_link_is_skipped_not_an_error() {
        // Content with no privileged background channel.
        let mut wiring = Wiring::new();
        wiring.add(link(Peer::Context));

        let out = peers(outbound_links(Role::Content, &wiring, Destination::PASSTHROUGH));
        assert_eq!(out, vec![Peer::Context]);
    }

    #[test]
    fn test_background_outbound_fans_to_all_tabs() {
        let mut wiring = Wiring::new();
        wiring.add(link(Peer::Content));
        wiring.add(link(Peer::Content));

        let out = peers(outbound_links(Role::Background, &wiring, Destination::CONTEXT));
        assert_eq!(out, vec![Peer::Content, Peer::Content]);
    }

    #[test]
    fn test_content_forward_never_echoes() {
        let wiring = content_wiring();

        // Arrived from background, addressed at background: dead-ends here.
        let out = forward_links(Role::Content, &wiring, Peer::Background, Destination::BACKGROUND);
        assert!(out.is_empty(), "must not echo toward the link it came from");

        // Passthrough from background: relayed to context only.
        let out = peers(forward_links(
            Role::Content,
            &wiring,
            Peer::Background,
            Destination::PASSTHROUGH,
        ));
        assert_eq!(out, vec![Peer::Context]);

        // Passthrough from context: relayed to background only.
        let out = peers(forward_links(
            Role::Content,
            &wiring,
            Peer::Context,
            Destination::PASSTHROUGH,
        ));
        assert_eq!(out, vec![Peer::Background]);
    }

    #[test]
    fn test_content_forwards_to_owned_worker() {
        let wiring = content_wiring();
        let dst = Destination::CONTENT.with_worker(5);

        let out = peers(forward_links(Role::Content, &wiring, Peer::Background, dst));
        assert_eq!(out, vec![Peer::Worker(5)]);

        // Unowned id: dropped at the edge.
        let out = forward_links(
            Role::Content,
            &wiring,
            Peer::Background,
            Destination::CONTENT.with_worker(9),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_context_relays_worker_traffic_up_only() {
        let mut wiring = Wiring::new();
        wiring.add(link(Peer::Content));
        wiring.add(link(Peer::Worker(3)));

        // From the worker, addressed beyond context: up the page link.
        let out = peers(forward_links(
            Role::Context,
            &wiring,
            Peer::Worker(3),
            Destination::PASSTHROUGH,
        ));
        assert_eq!(out, vec![Peer::Content]);

        // From content, not addressed here: context bridges nothing else.
        let out = forward_links(Role::Context, &wiring, Peer::Content, Destination::BACKGROUND);
        assert!(out.is_empty());
    }

    #[test]
    fn test_worker_never_forwards() {
        let mut wiring = Wiring::new();
        wiring.add(link(Peer::Context));

        let out = forward_links(Role::Worker, &wiring, Peer::Context, Destination::PASSTHROUGH);
        assert!(out.is_empty());
    }
}
