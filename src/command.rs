//! Operator commands read from the console of a peer.

use crate::{
    link::Link,
    log,
    process::{Process, Trigger},
};
use color_print::cformat;
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec};

/// Enum that represents a line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the other peers for the shared resource.
    Request,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "x" | "request" => Self::Request,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Function that reads commands until the input is closed and runs them on `process`.
pub async fn listen_for_input<L, R, I>(process: &Arc<Process<L, R>>, input: I)
where
    L: Link,
    R: Link,
    I: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(input, LinesCodec::new());

    log::info(&cformat!(
        "Type <bold>x</bold> to request the <yellow, bold>shared resource</yellow, bold>."
    ));

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error(&format!("Couldn't read input: {e}"));
                continue;
            }
        };

        match Command::parse(&line) {
            Command::Request => {
                if let Trigger::Requested(timestamp) = process.request_resource().await {
                    log::info(&cformat!(
                        "Requested the <yellow, bold>shared resource</yellow, bold> on timestamp <bold>{timestamp}</bold>."
                    ));
                }
            }
            Command::Empty => {}
            Command::Invalid(input) => log::warn(&cformat!("Invalid input <bold>{input}</bold>.")),
        }
    }

    log::info("Input closed, still serving the other peers.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        link::ChannelLink,
        message::Message,
        process::RequestState,
        registry::{Peer, Registry},
    };
    use futures::channel::mpsc;
    use std::time::Duration;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("x"), Command::Request);
        assert_eq!(Command::parse("  request \n"), Command::Request);
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("y"), Command::Invalid("y".to_string()));
        assert_eq!(Command::parse("X"), Command::Invalid("X".to_string()));
    }

    #[tokio::test]
    async fn input_triggers_one_request() {
        let (tx, mut rx) = mpsc::unbounded();
        let (resource, _resource_rx) = mpsc::unbounded();
        let registry = Registry::new(1, vec![Peer::new(2, ChannelLink(tx))]).unwrap();
        let process = Arc::new(Process::new(
            registry,
            ChannelLink(resource),
            Duration::from_secs(1),
        ));

        listen_for_input(&process, &b"hello\nx\n\nx\n"[..]).await;

        assert_eq!(rx.next().await, Some(Message::request(1, 1)));
        let snapshot = process.snapshot().await;
        assert_eq!(snapshot.state, RequestState::Wanted);
        assert_eq!(snapshot.clock, 1);
    }
}
