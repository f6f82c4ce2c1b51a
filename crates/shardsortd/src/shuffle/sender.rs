//! Outbound side of the shuffle.
//!
//! One call per destination peer: dial with bounded backoff, stream the
//! peer's partition in partition-map order, terminate with the sentinel
//! frame, close. Records are deliberately sent unsorted — ordering
//! happens once, on the receiving node, after consolidation.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use zerocopy::AsBytes;

use shardsort_core::Record;

use super::ShuffleError;

/// Dial backoff for peers that are not listening yet.
///
/// Nodes of a cluster start in no particular order, so early refusals
/// are expected. The delay doubles up to `max_delay`; once
/// `max_attempts` dials have failed the peer is reported unreachable
/// instead of blocking the run forever.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // ~75 seconds to exhaustion, enough for a whole-cluster cold start.
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            max_attempts: 40,
        }
    }
}

/// Dial `addr` until a connection succeeds or the policy is exhausted.
pub async fn connect_with_retry(
    addr: &str,
    policy: &RetryPolicy,
) -> Result<TcpStream, ShuffleError> {
    let mut delay = policy.initial_delay;
    let mut last_err = None;

    for attempt in 1..=policy.max_attempts {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                if attempt > 1 {
                    tracing::debug!(%addr, attempt, "peer reachable after retry");
                }
                return Ok(stream);
            }
            Err(e) => {
                tracing::trace!(%addr, attempt, error = %e, "dial failed");
                last_err = Some(e);
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(policy.max_delay);
        }
    }

    Err(ShuffleError::Unreachable {
        addr: addr.to_string(),
        attempts: policy.max_attempts,
        source: last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "no dial attempts permitted")),
    })
}

/// Deliver one destination's partition: every record, then the sentinel,
/// then close the connection.
pub async fn send_partition(
    addr: &str,
    records: Vec<Record>,
    policy: &RetryPolicy,
) -> Result<(), ShuffleError> {
    let stream = connect_with_retry(addr, policy).await?;
    let mut writer = BufWriter::new(stream);

    let send_err = |source: io::Error| ShuffleError::Send {
        addr: addr.to_string(),
        source,
    };

    for record in &records {
        writer.write_all(record.as_bytes()).await.map_err(send_err)?;
    }
    writer
        .write_all(Record::SENTINEL.as_bytes())
        .await
        .map_err(send_err)?;
    writer.flush().await.map_err(send_err)?;
    writer.shutdown().await.map_err(send_err)?;

    tracing::debug!(%addr, records = records.len(), "partition delivered");
    Ok(())
}
