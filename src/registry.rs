//! Static map from peer identity to the link used to reach that peer.

use crate::error::Error;
use std::sync::Arc;

/// Identity of a peer, 1-based and agreed by every peer at startup.
pub type PeerId = u32;

/// Function that checks that `self_id` is a valid ordinal in a group of `total` peers.
pub fn check_self_id(self_id: PeerId, total: usize) -> Result<(), Error> {
    if total == 0 {
        return Err(Error::EmptyPeerList);
    }
    if self_id == 0 || self_id as usize > total {
        return Err(Error::InvalidPeerId {
            id: self_id,
            peers: total,
        });
    }
    Ok(())
}

/// Struct that represents another peer of the group.
#[derive(Debug)]
pub struct Peer<L> {
    pub id: PeerId,
    pub link: Arc<L>,
}

impl<L> Peer<L> {
    pub fn new(id: PeerId, link: L) -> Self {
        Self {
            id,
            link: Arc::new(link),
        }
    }
}

impl<L> Clone for Peer<L> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            link: Arc::clone(&self.link),
        }
    }
}

/// Struct that holds every peer except the local one. Never mutated after construction.
#[derive(Debug)]
pub struct Registry<L> {
    self_id: PeerId,
    peers: Vec<Peer<L>>,
}

impl<L> Registry<L> {
    /// Function that builds the registry of `self_id` from the links to all the other peers.
    ///
    /// The ids of `peers` must be exactly `1..=N` without `self_id`, where `N = peers.len() + 1`.
    pub fn new(self_id: PeerId, mut peers: Vec<Peer<L>>) -> Result<Self, Error> {
        let total = peers.len() + 1;
        check_self_id(self_id, total)?;

        peers.sort_by_key(|peer| peer.id);
        let expected = (1..=total as PeerId).filter(|id| *id != self_id);
        for (peer, id) in peers.iter().zip(expected) {
            if peer.id != id {
                return Err(Error::UnknownPeer(peer.id));
            }
        }

        Ok(Self { self_id, peers })
    }

    pub fn self_id(&self) -> PeerId {
        self.self_id
    }

    /// Function that returns the peer with the given id.
    pub fn resolve(&self, id: PeerId) -> Result<&Peer<L>, Error> {
        self.peers
            .iter()
            .find(|peer| peer.id == id)
            .ok_or(Error::UnknownPeer(id))
    }

    /// Function that returns every peer except the local one, ordered by id.
    pub fn peers(&self) -> &[Peer<L>] {
        &self.peers
    }

    /// Number of replies needed before entering the critical section.
    pub fn quorum(&self) -> usize {
        self.peers.len()
    }
}
