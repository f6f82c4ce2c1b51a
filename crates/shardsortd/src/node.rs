//! One full sort run, from input shard to sorted output shard.
//!
//! Phases: load the cluster, read and partition the local input, start
//! the inbound receiver, stream every peer its partition, wait for the
//! completion barrier, merge and sort, write the output. Senders and the
//! consolidator run concurrently; a failure on either side aborts the
//! run rather than stalling behind the other.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use shardsort_core::config::ClusterConfig;
use shardsort_core::partition::PartitionMap;
use shardsort_core::sort::merge_and_sort;

use crate::shuffle::{self, consolidate, RetryPolicy, ShuffleReceiver};
use crate::storage;

/// The process invocation contract: this node's id plus the three paths.
#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub server_id: u32,
    pub input: PathBuf,
    pub output: PathBuf,
    pub cluster: PathBuf,
}

/// Run one node of the distributed sort with the default dial policy.
pub async fn run_node(opts: NodeOptions) -> Result<()> {
    run_node_with_policy(opts, RetryPolicy::default()).await
}

pub async fn run_node_with_policy(opts: NodeOptions, policy: RetryPolicy) -> Result<()> {
    let cluster = ClusterConfig::load(&opts.cluster)?;
    let me = cluster.require(opts.server_id)?.clone();
    let cluster_size = cluster.len();
    tracing::info!(
        server_id = opts.server_id,
        cluster_size,
        addr = %me.addr(),
        "node starting"
    );

    let records = storage::read_records(&opts.input)?;
    tracing::info!(records = records.len(), "local input loaded");
    let mut partitions = PartitionMap::build(records, cluster_size);

    // Listen before dialing anyone, so peers that start earlier than us
    // spend as little time as possible in their dial backoff.
    let (event_tx, mut event_rx) = shuffle::event_channel();
    let receiver = ShuffleReceiver::bind(&me.addr(), event_tx)
        .await
        .with_context(|| format!("failed to listen on {}", me.addr()))?;
    let accept_task = tokio::spawn(receiver.run());

    let mut senders = JoinSet::new();
    for peer in cluster.peers(opts.server_id) {
        let batch = partitions.take(peer.server_id);
        let addr = peer.addr();
        let peer_id = peer.server_id;
        let policy = policy.clone();
        senders.spawn(async move {
            tracing::debug!(peer = peer_id, records = batch.len(), "sending partition");
            shuffle::send_partition(&addr, batch, &policy).await
        });
    }
    let own = partitions.take(opts.server_id);

    // Wait on the completion barrier and on our own senders at the same
    // time: a dead peer fails the dial long before the barrier would
    // notice anything, and that failure must end the run.
    let expected_peers = cluster_size - 1;
    let consolidation = consolidate(&mut event_rx, expected_peers);
    tokio::pin!(consolidation);

    let remote = loop {
        tokio::select! {
            result = &mut consolidation => break result?,
            Some(joined) = senders.join_next() => {
                joined.context("sender task panicked")??;
            }
        }
    };
    while let Some(joined) = senders.join_next().await {
        joined.context("sender task panicked")??;
    }
    accept_task.abort();

    tracing::info!(
        remote = remote.len(),
        own = own.len(),
        "consolidation complete"
    );

    let sorted = merge_and_sort(remote, own);
    storage::write_records(&opts.output, &sorted)?;
    tracing::info!(
        records = sorted.len(),
        output = %opts.output.display(),
        "sorted shard written"
    );
    Ok(())
}
