//! Distributed mutual exclusion between peers over UDP, following Ricart-Agrawala with Lamport clocks.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod log;
pub mod message;
pub mod poisson;
pub mod process;
pub mod registry;
pub mod resource;

pub use error::Error;
pub use message::{Message, MessageKind};
pub use process::{Process, RequestState, Trigger};

/// Well known address of the shared resource.
pub const DEFAULT_RESOURCE_ADDRESS: &str = "127.0.0.1:10000";

/// Time a peer holds the shared resource, in milliseconds.
pub const DEFAULT_HOLD_MS: u64 = 2000;
