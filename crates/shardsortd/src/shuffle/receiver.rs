//! Inbound side of the shuffle.
//!
//! One accept loop, one spawned task per accepted connection. Connection
//! tasks decode the raw stream into records and publish events into the
//! shared channel; classification of what completion *means* stays with
//! the consolidator. A connection failure or an accept failure is
//! published as a `Failed` event and ends the run.

use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

use shardsort_core::wire::FrameDecoder;

use super::{ConnId, EventSender, ShuffleError, ShuffleEvent};

pub struct ShuffleReceiver {
    listener: TcpListener,
    events: EventSender,
}

impl ShuffleReceiver {
    /// Bind this node's shuffle listener.
    pub async fn bind(addr: &str, events: EventSender) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, events })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the run ends or accepting fails.
    ///
    /// The loop never terminates on its own — the orchestrator aborts it
    /// once consolidation completes.
    pub async fn run(self) {
        let mut next_conn: ConnId = 0;
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let conn = next_conn;
                    next_conn += 1;
                    tracing::debug!(conn, %peer, "inbound shuffle connection");
                    tokio::spawn(drain_connection(conn, stream, self.events.clone()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed, aborting shuffle");
                    let _ = self
                        .events
                        .send(ShuffleEvent::Failed(ShuffleError::Accept(e)));
                    return;
                }
            }
        }
    }
}

async fn drain_connection(conn: ConnId, mut stream: TcpStream, events: EventSender) {
    if let Err(err) = drain_frames(conn, &mut stream, &events).await {
        let _ = events.send(ShuffleEvent::Failed(err));
    }
}

/// Read one peer's stream to EOF, publishing every decoded record and a
/// single `PeerDone` when the sentinel frame arrives.
async fn drain_frames(
    conn: ConnId,
    stream: &mut TcpStream,
    events: &EventSender,
) -> Result<(), ShuffleError> {
    let mut decoder = FrameDecoder::new();
    let mut chunk = [0u8; 8192];
    let mut done = false;
    let mut received = 0usize;

    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|source| ShuffleError::Connection { conn, source })?;

        if n == 0 {
            if decoder.residual() > 0 {
                tracing::trace!(
                    conn,
                    bytes = decoder.residual(),
                    "dropping partial trailing frame"
                );
            }
            if !done {
                return Err(ShuffleError::Disconnected { conn });
            }
            tracing::debug!(conn, records = received, "peer stream drained");
            return Ok(());
        }

        decoder.extend(&chunk[..n]);
        while let Some(record) = decoder.next_record() {
            if record.is_sentinel() {
                if done {
                    return Err(ShuffleError::DuplicateCompletion { conn });
                }
                done = true;
                if events.send(ShuffleEvent::PeerDone { conn }).is_err() {
                    // Consolidation already finished; nothing left to do.
                    return Ok(());
                }
            } else {
                if done {
                    return Err(ShuffleError::TrailingRecord { conn });
                }
                received += 1;
                if events.send(ShuffleEvent::Record(record)).is_err() {
                    return Ok(());
                }
            }
        }
    }
}
