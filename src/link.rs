//! Module that moves messages between peers and to the shared resource.

use crate::{
    error::Error,
    log,
    message::{Message, MessageCodec},
    registry::{self, Peer, PeerId, Registry},
};
use async_trait::async_trait;
use color_print::cformat;
use futures::channel::mpsc::UnboundedSender;
use std::{io, net::SocketAddr, sync::Arc};
use tokio::net::UdpSocket;
use tokio_util::udp::UdpFramed;

/// Stream of the datagrams received on a peer's listening endpoint.
pub type Incoming = UdpFramed<MessageCodec>;

/// Trait that represents a one way association to a single destination.
#[async_trait]
pub trait Link: Send + Sync + 'static {
    async fn send(&self, message: &Message) -> Result<(), Error>;
}

/// Struct that represents a UDP association bound to an ephemeral port and connected to one endpoint.
#[derive(Debug)]
pub struct UdpLink {
    address: SocketAddr,
    socket: UdpSocket,
}

impl UdpLink {
    pub async fn connect(address: SocketAddr) -> Result<Self, Error> {
        let local = if address.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(address).await?;

        Ok(Self { address, socket })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

#[async_trait]
impl Link for UdpLink {
    async fn send(&self, message: &Message) -> Result<(), Error> {
        self.socket.send(&message.to_json_bytes()?).await?;
        Ok(())
    }
}

/// Struct that represents an in-memory association, used to run peers without sockets.
#[derive(Debug, Clone)]
pub struct ChannelLink(pub UnboundedSender<Message>);

#[async_trait]
impl Link for ChannelLink {
    async fn send(&self, message: &Message) -> Result<(), Error> {
        self.0
            .unbounded_send(*message)
            .map_err(|_| Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "channel closed")))
    }
}

/// Function that binds the listening endpoint of a peer or of the shared resource.
pub async fn listen(address: SocketAddr) -> Result<Incoming, Error> {
    let socket = UdpSocket::bind(address).await?;
    Ok(UdpFramed::new(socket, MessageCodec))
}

/// Function that opens one association to every peer of `endpoints` except `self_id`.
///
/// `endpoints` holds the address of peer `i` at index `i - 1`.
pub async fn connect_registry(
    self_id: PeerId,
    endpoints: &[SocketAddr],
) -> Result<Registry<UdpLink>, Error> {
    registry::check_self_id(self_id, endpoints.len())?;

    let mut peers = Vec::with_capacity(endpoints.len() - 1);
    for (id, address) in (1..).zip(endpoints) {
        if id == self_id {
            continue;
        }
        peers.push(Peer::new(id, UdpLink::connect(*address).await?));
    }

    Registry::new(self_id, peers)
}

/// Function that sends a message on its own task. A failure is logged and the message is lost.
pub fn send_detached<L: Link>(link: Arc<L>, message: Message, destination: String) {
    tokio::spawn(async move {
        if let Err(e) = link.send(&message).await {
            log::error(&cformat!(
                "Couldn't send <bold>{}</bold> to {}: {}",
                message.kind,
                destination,
                e
            ));
        }
    });
}

/// Function that fans a message out to every peer, one independent send per peer.
pub fn broadcast<L: Link>(peers: &[Peer<L>], message: Message) {
    for peer in peers {
        send_detached(
            Arc::clone(&peer.link),
            message,
            cformat!("peer <bold>{}</bold>", peer.id),
        );
    }
}
