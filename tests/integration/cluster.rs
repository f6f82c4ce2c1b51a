//! Multi-node end-to-end runs.

use shardsort_core::Record;

use crate::*;

/// Three nodes, one partition bit: ASCII letters have a zero top bit and
/// belong to node 0, bytes >= 0x80 to node 1, and node 2 owns no range
/// at all — it participates in the shuffle and ends up empty.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_nodes_split_on_the_top_key_bit() {
    let inputs = vec![
        vec![record(b"C"), record(b"A")],
        vec![record(&[0x90])],
        vec![],
    ];

    let outputs = run_cluster("three-node-split", inputs).await.unwrap();

    assert_eq!(
        keys(&outputs[0]),
        vec![b"A.........".to_vec(), b"C.........".to_vec()],
        "node 0 must own both letters, 'A' before 'C'"
    );
    assert_eq!(keys(&outputs[1]), vec![vec![0x90, 0x2e, 0x2e, 0x2e, 0x2e, 0x2e, 0x2e, 0x2e, 0x2e, 0x2e]]);
    assert!(
        !outputs[1].iter().any(|r| r.key()[0] == b'A' || r.key()[0] == b'C'),
        "node 1 must not hold node 0's records"
    );
    assert!(outputs[2].is_empty(), "node 2 owns no key range");
}

/// Four nodes, every node holds one record for every destination. Each
/// output shard must be sorted, hold exactly the keys of its quadrant,
/// and the concatenation in server-id order must be the global sorted
/// order of all inputs.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn four_nodes_exchange_all_to_all() {
    let mut inputs = Vec::new();
    for node in 0..4u8 {
        inputs.push(vec![
            record(&[0xc0 + node]),
            record(&[node]),
            record(&[0x80 + node]),
            record(&[0x40 + node]),
        ]);
    }
    let mut expected: Vec<Record> = inputs.iter().flatten().cloned().collect();
    expected.sort_unstable_by(|a, b| a.key().cmp(b.key()));

    let outputs = run_cluster("four-node-all-to-all", inputs).await.unwrap();

    for (id, shard) in outputs.iter().enumerate() {
        assert_eq!(shard.len(), 4, "node {id} owns one record per sender");
        assert!(is_sorted(shard), "node {id} output is not sorted");
        assert!(
            shard.iter().all(|r| r.key()[0] >> 6 == id as u8),
            "node {id} holds a record outside its key range"
        );
    }

    let global: Vec<Record> = outputs.into_iter().flatten().collect();
    assert_eq!(global, expected, "concatenated shards are not the global order");
}

/// The 0x7f/0x80 boundary is exactly where a one-bit split divides.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_nodes_split_exactly_at_the_sign_bit() {
    let inputs = vec![
        vec![record(&[0x80]), record(&[0x7f])],
        vec![record(&[0x00]), record(&[0xff])],
    ];

    let outputs = run_cluster("two-node-boundary", inputs).await.unwrap();

    assert_eq!(
        keys(&outputs[0]).iter().map(|k| k[0]).collect::<Vec<_>>(),
        vec![0x00, 0x7f]
    );
    assert_eq!(
        keys(&outputs[1]).iter().map(|k| k[0]).collect::<Vec<_>>(),
        vec![0x80, 0xff]
    );
}

/// Records with equal leading bytes still order on the later key bytes
/// once they meet on the owning node.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ties_break_on_the_last_key_byte() {
    let inputs = vec![
        vec![record(b"samekey..B")],
        vec![record(b"samekey..A")],
    ];

    let outputs = run_cluster("tie-break", inputs).await.unwrap();

    assert_eq!(
        keys(&outputs[0]),
        vec![b"samekey..A".to_vec(), b"samekey..B".to_vec()]
    );
    assert!(outputs[1].is_empty());
}
