//! Ricart-Agrawala mutual exclusion engine of a single peer.
//!
//! A peer that wants the shared resource broadcasts a `REQUEST` stamped with its Lamport clock and
//! enters the critical section once every other peer has answered with a `REPLY`. A peer that is
//! holding the resource, or that is waiting with an older request, defers its reply until it
//! leaves the critical section. Requests are ordered by `(timestamp, peer id)`, so equal timestamps
//! are won by the lower id.

use crate::{
    clock::{LogicalClock, Timestamp},
    error::Error,
    link::{self, Link},
    log,
    message::{Message, MessageKind},
    registry::{PeerId, Registry},
};
use color_print::cformat;
use futures::{Stream, StreamExt};
use std::{collections::BTreeSet, fmt, mem, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::sleep};

/// Enum that tells where a peer stands with respect to the shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Released,
    Wanted,
    Held,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Released => write!(f, "RELEASED"),
            Self::Wanted => write!(f, "WANTED"),
            Self::Held => write!(f, "HELD"),
        }
    }
}

/// Enum that represents the outcome of a local request for the shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A request stamped with this timestamp was broadcast.
    Requested(Timestamp),
    /// The peer was not released, nothing changed.
    Ignored(RequestState),
}

/// Read-only view of the protocol state of a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: RequestState,
    pub clock: Timestamp,
    pub pending_replies: usize,
    pub deferred: Vec<PeerId>,
    pub episodes: u64,
}

/// Everything the protocol mutates, guarded as a single unit.
#[derive(Debug)]
struct Protocol {
    clock: LogicalClock,
    state: RequestState,
    request_timestamp: Timestamp,
    replied: BTreeSet<PeerId>,
    deferred: Vec<PeerId>,
    episodes: u64,
}

impl Protocol {
    fn new() -> Self {
        Self {
            clock: LogicalClock::new(),
            state: RequestState::Released,
            request_timestamp: 0,
            replied: BTreeSet::new(),
            deferred: Vec::new(),
            episodes: 0,
        }
    }

    fn alter_state(&mut self, id: PeerId, state: RequestState) {
        self.state = state;
        log::info(&cformat!(
            "Peer <bold>{}</bold> is now <yellow, bold>{}</yellow, bold> (clock <bold>{}</bold>).",
            id,
            state,
            self.clock.value()
        ));
    }

    /// Tells if the pending local request must be served before a request of `from` at `timestamp`.
    fn has_priority(&self, id: PeerId, from: PeerId, timestamp: Timestamp) -> bool {
        (self.request_timestamp, id) < (timestamp, from)
    }
}

/// Struct that represents the local peer running the mutual exclusion protocol.
///
/// `L` reaches the other peers, `R` reaches the shared resource.
pub struct Process<L, R> {
    registry: Registry<L>,
    resource: Arc<R>,
    hold: Duration,
    protocol: Mutex<Protocol>,
}

impl<L: Link, R: Link> Process<L, R> {
    pub fn new(registry: Registry<L>, resource: R, hold: Duration) -> Self {
        Self {
            registry,
            resource: Arc::new(resource),
            hold,
            protocol: Mutex::new(Protocol::new()),
        }
    }

    pub fn id(&self) -> PeerId {
        self.registry.self_id()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let protocol = self.protocol.lock().await;
        Snapshot {
            state: protocol.state,
            clock: protocol.clock.value(),
            pending_replies: protocol.replied.len(),
            deferred: protocol.deferred.clone(),
            episodes: protocol.episodes,
        }
    }

    pub async fn state(&self) -> RequestState {
        self.protocol.lock().await.state
    }

    /// Function that asks every other peer for the shared resource.
    ///
    /// Only a released peer may ask; otherwise the trigger is ignored. A peer without others
    /// enters the critical section straight away, on its own task.
    pub async fn request_resource(self: &Arc<Self>) -> Trigger {
        let id = self.id();
        let (request, alone) = {
            let mut protocol = self.protocol.lock().await;
            if protocol.state != RequestState::Released {
                log::warn(&cformat!(
                    "Request ignored, peer is <bold>{}</bold> and not <bold>RELEASED</bold>.",
                    protocol.state
                ));
                return Trigger::Ignored(protocol.state);
            }

            protocol.clock.advance(1);
            protocol.request_timestamp = protocol.clock.value();
            protocol.replied.clear();
            protocol.alter_state(id, RequestState::Wanted);

            let alone = self.registry.quorum() == 0;
            if alone {
                protocol.alter_state(id, RequestState::Held);
            }
            (Message::request(id, protocol.clock.value()), alone)
        };

        if alone {
            let process = Arc::clone(self);
            tokio::spawn(async move { process.enter_critical_section().await });
        } else {
            log::debug(&cformat!("Broadcasting {}.", request.describe()));
            link::broadcast(self.registry.peers(), request);
        }
        Trigger::Requested(request.timestamp)
    }

    /// Function that handles one message received from another peer.
    ///
    /// Safe to call concurrently. Returns once the message is handled, which for the last missing
    /// `REPLY` includes the whole critical section.
    pub async fn on_receive(&self, message: Message) -> Result<(), Error> {
        match message.kind {
            MessageKind::Request => self.on_request(message).await,
            MessageKind::Reply => self.on_reply(message).await,
            MessageKind::Acquire => {
                self.protocol.lock().await.clock.merge(message.timestamp);
                log::warn(&cformat!(
                    "Ignoring {}, only the shared resource handles it.",
                    message.describe()
                ));
                Ok(())
            }
        }
    }

    async fn on_request(&self, message: Message) -> Result<(), Error> {
        let id = self.id();
        let peer = self.registry.resolve(message.from)?;

        let reply = {
            let mut protocol = self.protocol.lock().await;
            // decided on the clock as it was when the request arrived
            let defer = match protocol.state {
                RequestState::Held => true,
                RequestState::Wanted => protocol.has_priority(id, message.from, message.timestamp),
                RequestState::Released => false,
            };
            protocol.clock.merge(message.timestamp);

            if defer {
                // a duplicated datagram must not earn a second reply on release
                if !protocol.deferred.contains(&message.from) {
                    protocol.deferred.push(message.from);
                }
                log::debug(&cformat!(
                    "Deferred the reply to {}.",
                    message.describe()
                ));
                None
            } else {
                Some(Message::reply(id, protocol.clock.value()))
            }
        };

        if let Some(reply) = reply {
            log::debug(&cformat!("Replying to {}.", message.describe()));
            link::send_detached(
                Arc::clone(&peer.link),
                reply,
                cformat!("peer <bold>{}</bold>", peer.id),
            );
        }
        Ok(())
    }

    async fn on_reply(&self, message: Message) -> Result<(), Error> {
        let id = self.id();
        self.registry.resolve(message.from)?;

        let acquired = {
            let mut protocol = self.protocol.lock().await;
            protocol.clock.merge(message.timestamp);

            if protocol.state != RequestState::Wanted {
                log::warn(&cformat!(
                    "Ignoring {}, peer is <bold>{}</bold>.",
                    message.describe(),
                    protocol.state
                ));
                return Ok(());
            }

            protocol.replied.insert(message.from);
            log::debug(&cformat!(
                "Got {} ({}/{}).",
                message.describe(),
                protocol.replied.len(),
                self.registry.quorum()
            ));

            if protocol.replied.len() >= self.registry.quorum() {
                protocol.replied.clear();
                protocol.alter_state(id, RequestState::Held);
                true
            } else {
                false
            }
        };

        if acquired {
            self.enter_critical_section().await;
        }
        Ok(())
    }

    /// Notifies the shared resource, occupies it for the hold duration and releases it.
    async fn enter_critical_section(&self) {
        let acquire = {
            let protocol = self.protocol.lock().await;
            Message::acquire(self.id(), protocol.clock.value())
        };

        log::info(&cformat!(
            "Acquired the <yellow, bold>shared resource</yellow, bold> on timestamp <bold>{}</bold>.",
            acquire.timestamp
        ));
        link::send_detached(
            Arc::clone(&self.resource),
            acquire,
            "the shared resource".to_string(),
        );

        sleep(self.hold).await;
        log::info(&cformat!(
            "Left the <yellow, bold>shared resource</yellow, bold>."
        ));

        self.release_critical_section().await;
    }

    /// Goes back to released and answers every deferred request.
    async fn release_critical_section(&self) {
        let id = self.id();
        let (deferred, timestamp) = {
            let mut protocol = self.protocol.lock().await;
            protocol.clock.advance(1);
            protocol.episodes += 1;
            protocol.alter_state(id, RequestState::Released);
            (mem::take(&mut protocol.deferred), protocol.clock.value())
        };

        for from in deferred {
            match self.registry.resolve(from) {
                Ok(peer) => link::send_detached(
                    Arc::clone(&peer.link),
                    Message::reply(id, timestamp),
                    cformat!("peer <bold>{}</bold>", peer.id),
                ),
                Err(e) => log::error(&format!("{e}")),
            }
        }
    }

    /// Function that runs the dispatch loop over the messages received by this peer.
    ///
    /// Each message is handled on its own task. Malformed datagrams are logged and dropped.
    pub async fn serve<S>(self: Arc<Self>, mut incoming: S)
    where
        S: Stream<Item = Result<Message, Error>> + Unpin,
    {
        while let Some(item) = incoming.next().await {
            match item {
                Ok(message) => {
                    log::debug(&cformat!("Received {}.", message.describe()));
                    let process = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = process.on_receive(message).await {
                            log::error(&format!("{e}"));
                        }
                    });
                }
                Err(e) => log::warn(&cformat!("Dropped a datagram: {e}")),
            }
        }
    }
}
