//! Errors shared by the peer, the transport and the shared resource.

use crate::registry::PeerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no link with id {0}")]
    UnknownPeer(PeerId),

    #[error("peer id {id} is outside of 1..={peers}")]
    InvalidPeerId { id: PeerId, peers: usize },

    #[error("the peer list is empty")]
    EmptyPeerList,

    #[error("couldn't resolve address {0}")]
    Resolve(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
