//! # Injected transport handles.
//!
//! [`Wiring`] is the set of [`Link`]s a node can reach directly — explicitly
//! injected collaborator handles, valid for the life of the node, never
//! ambient globals. Each link pairs a transport with the identity of the
//! party on its far end, which is what echo prevention keys on.

use std::sync::Arc;

use crate::envelope::Envelope;
use crate::routing::{Peer, Role, WorkerId};
use crate::transport::Transport;

/// One directed attachment: a transport plus who is on the other end.
pub struct Link {
    peer: Peer,
    transport: Arc<dyn Transport>,
}

impl Link {
    /// Creates a link to `peer` over `transport`.
    pub fn new(peer: Peer, transport: Arc<dyn Transport>) -> Self {
        Self { peer, transport }
    }

    /// Identity of the far end.
    #[inline]
    pub fn peer(&self) -> Peer {
        self.peer
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Sends an envelope down this link. Fire-and-forget.
    pub(crate) fn send(&self, envelope: Envelope) {
        self.transport.send(envelope);
    }
}

/// The links available to one node.
#[derive(Default)]
pub struct Wiring {
    links: Vec<Link>,
}

impl Wiring {
    /// Creates empty wiring (a node with no reachable peers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link, builder style.
    #[must_use]
    pub fn with_link(mut self, peer: Peer, transport: Arc<dyn Transport>) -> Self {
        self.add(Link::new(peer, transport));
        self
    }

    /// Adds a link in place.
    pub fn add(&mut self, link: Link) {
        self.links.push(link);
    }

    /// All links, in attachment order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True if there are no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// First link whose far end is the given (non-worker) role.
    pub(crate) fn link_to_role(&self, role: Role) -> Option<&Link> {
        self.links.iter().find(|l| l.peer.role() == role)
    }

    /// Every link whose far end is the given role (background's tabs).
    pub(crate) fn links_to_role(&self, role: Role) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.peer.role() == role)
    }

    /// The link to a specific owned worker, if hosted here.
    pub(crate) fn worker_link(&self, id: WorkerId) -> Option<&Link> {
        self.links.iter().find(|l| l.peer == Peer::Worker(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InboundHandler;

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, _envelope: Envelope) {}
        fn on_receive(&self, _handler: InboundHandler) {}
    }

    #[test]
    fn test_lookup_by_role_and_worker() {
        let wiring = Wiring::new()
            .with_link(Peer::Background, Arc::new(NullTransport))
            .with_link(Peer::Worker(3), Arc::new(NullTransport));

        assert!(wiring.link_to_role(Role::Background).is_some());
        assert!(wiring.link_to_role(Role::Context).is_none());
        assert!(wiring.worker_link(3).is_some());
        assert!(wiring.worker_link(4).is_none());
        assert_eq!(wiring.len(), 2);
    }
}
