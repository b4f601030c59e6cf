//! Module that contains the messages exchanged between peers and with the shared resource.

use crate::{clock::Timestamp, error::Error, registry::PeerId};
use bytes::{Buf, BytesMut};
use color_print::cformat;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::codec::{Decoder, Encoder};

/// Enum that represents the kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    /// Asks every other peer for permission to enter the critical section.
    Request,
    /// Grants the permission asked by a request.
    Reply,
    /// Tells the shared resource that the sender entered the critical section.
    Acquire,
}

/// Struct that represents a single datagram of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "From")]
    pub from: PeerId,
    #[serde(rename = "Timestamp")]
    pub timestamp: Timestamp,
    #[serde(rename = "Type")]
    pub kind: MessageKind,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "REQUEST"),
            Self::Reply => write!(f, "REPLY"),
            Self::Acquire => write!(f, "ACQUIRE"),
        }
    }
}

impl Message {
    pub fn new(from: PeerId, timestamp: Timestamp, kind: MessageKind) -> Self {
        Self {
            from,
            timestamp,
            kind,
        }
    }

    pub fn request(from: PeerId, timestamp: Timestamp) -> Self {
        Self::new(from, timestamp, MessageKind::Request)
    }

    pub fn reply(from: PeerId, timestamp: Timestamp) -> Self {
        Self::new(from, timestamp, MessageKind::Reply)
    }

    pub fn acquire(from: PeerId, timestamp: Timestamp) -> Self {
        Self::new(from, timestamp, MessageKind::Acquire)
    }

    /// Function that returns the message as JSON encoded bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Function that parses a message from JSON encoded bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice::<Self>(bytes)?)
    }

    /// Function that returns a coloured one line description of the message.
    pub fn describe(&self) -> String {
        cformat!(
            "<bold>{}</bold> from peer <bold>{}</bold> at timestamp <bold>{}</bold>",
            self.kind,
            self.from,
            self.timestamp
        )
    }
}

/// Codec that maps one datagram to one JSON encoded [`Message`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, Error> {
        if src.is_empty() {
            return Ok(None);
        }
        // consume the whole datagram first so a malformed one isn't decoded again
        let datagram = src.split_to(src.len());
        Message::from_json_bytes(datagram.chunk()).map(Some)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), Error> {
        dst.extend_from_slice(&message.to_json_bytes()?);
        Ok(())
    }
}
