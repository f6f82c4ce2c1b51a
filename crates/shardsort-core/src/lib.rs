//! shardsort-core — record wire format, partitioning, cluster config,
//! and the merge/sort step. The daemon crate depends on this one.

pub mod config;
pub mod partition;
pub mod sort;
pub mod wire;

pub use wire::{Record, KEY_LEN, RECORD_LEN};
