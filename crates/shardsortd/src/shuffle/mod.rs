//! The all-to-all shuffle: every node streams each peer's partition to
//! that peer and receives its own partition from every other node.
//!
//! All inbound traffic funnels into one unbounded event channel with a
//! single consumer, the consolidator. Connection tasks are the only
//! producers; nothing else is shared between tasks.

use std::io;

use tokio::sync::mpsc;

use shardsort_core::Record;

pub mod consolidate;
pub mod receiver;
pub mod sender;

pub use consolidate::consolidate;
pub use receiver::ShuffleReceiver;
pub use sender::{send_partition, RetryPolicy};

/// Identity of one accepted inbound connection.
///
/// The wire protocol carries no sender id, so the connection is the only
/// stable identity the receiving side has. Each peer opens exactly one
/// connection per run, which makes the completion barrier countable by
/// connection.
pub type ConnId = u64;

/// What a connection task publishes to the consolidator.
#[derive(Debug)]
pub enum ShuffleEvent {
    /// One decoded data record, in stream order for its connection,
    /// in no particular order across connections.
    Record(Record),
    /// The connection's end-of-stream marker arrived.
    PeerDone { conn: ConnId },
    /// The connection (or the accept loop) failed; fatal to the run.
    Failed(ShuffleError),
}

pub type EventSender = mpsc::UnboundedSender<ShuffleEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ShuffleEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Everything that can go wrong during the shuffle. All variants are
/// fatal to the run; there is no per-connection recovery.
#[derive(Debug, thiserror::Error)]
pub enum ShuffleError {
    #[error("failed to accept an inbound shuffle connection: {0}")]
    Accept(#[source] io::Error),

    #[error("inbound connection {conn} failed mid-stream: {source}")]
    Connection {
        conn: ConnId,
        #[source]
        source: io::Error,
    },

    #[error("inbound connection {conn} closed before its end-of-stream marker")]
    Disconnected { conn: ConnId },

    #[error("inbound connection {conn} signaled completion twice")]
    DuplicateCompletion { conn: ConnId },

    #[error("inbound connection {conn} sent a record after its end-of-stream marker")]
    TrailingRecord { conn: ConnId },

    #[error("peer {addr} unreachable after {attempts} dial attempts: {source}")]
    Unreachable {
        addr: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to stream partition to {addr}: {source}")]
    Send {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("shuffle event channel closed with {done} of {expected} peers complete")]
    ChannelClosed { done: usize, expected: usize },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
