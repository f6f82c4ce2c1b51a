//! The final per-node ordering step.

use crate::wire::Record;

/// Combine the consolidated remote records with the node's own partition
/// and sort the whole sequence by key: unsigned, byte-wise, left to
/// right. Keys are fixed length, so no prefix case arises. Order among
/// equal keys is unspecified.
pub fn merge_and_sort(mut remote: Vec<Record>, own: Vec<Record>) -> Vec<Record> {
    remote.extend(own);
    remote.sort_unstable_by(|a, b| a.key().cmp(b.key()));
    remote
}
