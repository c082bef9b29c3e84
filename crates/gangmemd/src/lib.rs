//! gangmemd — drives the gangmem plugin the way a host scheduler would.
//!
//! Loads a cluster description into a [`gangmem_state::StateStore`], builds
//! the plugin from `gangmem.toml`, and runs one scheduling cycle per unit.

pub mod cluster;
pub mod cycle;

pub use cluster::{ClusterSpec, NodeSpec, Quantity};
pub use cycle::{CycleOutcome, ExcludedNode, run_cycle};
