//! The shared resource: a process that only listens for and logs `ACQUIRE` notifications.
//!
//! It enforces nothing, exclusion is decided by the peers before they notify it.

use crate::{
    error::Error,
    link,
    log,
    message::{Message, MessageKind},
    registry::PeerId,
};
use color_print::cformat;
use futures::StreamExt;
use std::{collections::BTreeMap, net::SocketAddr};

#[derive(Debug, Clone)]
pub struct SharedResource {
    pub address: SocketAddr,
    pub acquisitions: BTreeMap<PeerId, u64>,
}

impl SharedResource {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            acquisitions: BTreeMap::new(),
        }
    }

    /// Function that records a notification. Returns `false` for anything but an `ACQUIRE`.
    pub fn record(&mut self, message: &Message, sender: SocketAddr) -> bool {
        if message.kind != MessageKind::Acquire {
            log::warn(&cformat!(
                "Ignoring {} sent by <bold>{}</bold>.",
                message.describe(),
                sender
            ));
            return false;
        }

        let count = self.acquisitions.entry(message.from).or_insert(0);
        *count += 1;
        log::info(&cformat!(
            "Peer <bold>{}</bold> acquired the <yellow, bold>shared resource</yellow, bold> on timestamp <bold>{}</bold> from <bold>{}</bold> ({} times so far).",
            message.from,
            message.timestamp,
            sender,
            count
        ));
        true
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        let mut incoming = link::listen(self.address).await?;
        log::info(&cformat!(
            "Shared resource listening on <bold>{}</bold>.",
            self.address
        ));

        while let Some(item) = incoming.next().await {
            match item {
                Ok((message, sender)) => {
                    self.record(&message, sender);
                }
                Err(e) => log::warn(&cformat!("Dropped a datagram: {e}")),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SocketAddr {
        "127.0.0.1:20001".parse().unwrap()
    }

    #[test]
    fn counts_acquisitions_per_peer() {
        let mut resource = SharedResource::new("127.0.0.1:10000".parse().unwrap());

        assert!(resource.record(&Message::acquire(1, 3), sender()));
        assert!(resource.record(&Message::acquire(2, 6), sender()));
        assert!(resource.record(&Message::acquire(1, 9), sender()));

        assert_eq!(resource.acquisitions.get(&1), Some(&2));
        assert_eq!(resource.acquisitions.get(&2), Some(&1));
    }

    #[test]
    fn ignores_protocol_messages() {
        let mut resource = SharedResource::new("127.0.0.1:10000".parse().unwrap());

        assert!(!resource.record(&Message::request(1, 1), sender()));
        assert!(!resource.record(&Message::reply(2, 2), sender()));
        assert!(resource.acquisitions.is_empty());
    }
}
