//! Single-node runs and failure paths.

use std::time::Duration;

use shardsortd::shuffle::RetryPolicy;
use shardsortd::{run_node_with_policy, storage, NodeOptions};

use crate::*;

/// A cluster of one requires zero completions: the barrier releases
/// immediately and the run is a plain local sort.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_node_run_is_a_local_sort() {
    let inputs = vec![vec![record(b"zz"), record(b"aa"), record(b"mm")]];

    let outputs = tokio::time::timeout(
        Duration::from_secs(10),
        run_cluster("single-node-sort", inputs),
    )
    .await
    .expect("single-node run must not wait on any peer")
    .unwrap();

    assert_eq!(
        keys(&outputs[0]),
        vec![
            b"aa........".to_vec(),
            b"mm........".to_vec(),
            b"zz........".to_vec(),
        ]
    );
}

/// Zero local records, zero peers: the final output is empty.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_node_empty_input_yields_empty_output() {
    let outputs = tokio::time::timeout(
        Duration::from_secs(10),
        run_cluster("single-node-empty", vec![vec![]]),
    )
    .await
    .expect("empty single-node run must terminate immediately")
    .unwrap();

    assert!(outputs[0].is_empty());
}

/// A configured peer that never comes up fails the run with a reported
/// error once the dial policy is exhausted, instead of blocking forever.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_peer_fails_the_run_instead_of_hanging() {
    let dir = scratch_dir("missing-peer");
    let config = write_cluster_config(&dir, &free_ports(2));

    let input = dir.join("input-0.bin");
    storage::write_records(&input, &[record(&[0xf0])]).unwrap();

    let policy = RetryPolicy {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_attempts: 3,
    };
    let opts = NodeOptions {
        server_id: 0,
        input,
        output: dir.join("output-0.bin"),
        cluster: config,
    };

    let err = tokio::time::timeout(Duration::from_secs(10), run_node_with_policy(opts, policy))
        .await
        .expect("run must fail, not hang")
        .unwrap_err();
    assert!(
        format!("{err:#}").contains("unreachable after 3 dial attempts"),
        "unexpected error: {err:#}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
