//! The completion barrier: wait for every peer to finish sending.
//!
//! The run cannot complete until all `S - 1` peers have delivered their
//! end-of-stream marker. Completion is tracked as a set of connection
//! identities rather than a bare count, so a duplicated signal is a
//! detected error instead of a silent miscount. There is no timeout — a
//! peer that connects and then never finishes stalls the node, which is
//! the protocol's stated liveness assumption.

use std::collections::HashSet;

use shardsort_core::Record;

use super::{ConnId, EventReceiver, ShuffleError, ShuffleEvent};

/// Drain the event channel until `expected_peers` distinct connections
/// have completed, returning every data record received from them.
///
/// With `expected_peers == 0` (a single-node cluster) this returns an
/// empty result set immediately, without touching the channel.
pub async fn consolidate(
    events: &mut EventReceiver,
    expected_peers: usize,
) -> Result<Vec<Record>, ShuffleError> {
    let mut records = Vec::new();
    let mut complete: HashSet<ConnId> = HashSet::new();

    while complete.len() < expected_peers {
        match events.recv().await {
            None => {
                return Err(ShuffleError::ChannelClosed {
                    done: complete.len(),
                    expected: expected_peers,
                })
            }
            Some(ShuffleEvent::Record(record)) => records.push(record),
            Some(ShuffleEvent::PeerDone { conn }) => {
                if !complete.insert(conn) {
                    return Err(ShuffleError::DuplicateCompletion { conn });
                }
                tracing::debug!(
                    conn,
                    complete = complete.len(),
                    expected = expected_peers,
                    "peer completed"
                );
            }
            Some(ShuffleEvent::Failed(err)) => return Err(err),
        }
    }

    Ok(records)
}
