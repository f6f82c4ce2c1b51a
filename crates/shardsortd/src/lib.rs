//! shardsortd — distributed sort node.
//!
//! A node reads its local shard of 100-byte records, routes each record
//! to its range owner over TCP, collects the records the rest of the
//! cluster routes back to it, and writes its slice of the global sorted
//! order. Exposed as a library so integration tests can run whole
//! clusters in one process.

pub mod node;
pub mod shuffle;
pub mod storage;

pub use node::{run_node, run_node_with_policy, NodeOptions};
