//! Node scoring by memory headroom.
//!
//! Each node is scored independently from its own snapshot:
//! - **Least**: `LEAST_MODE_NUMERATOR / headroom`, favoring fuller nodes (bin-packing)
//! - **Most**: `headroom` itself, favoring emptier nodes (spreading)
//!
//! Raw scores are unbounded; [`crate::normalize`] maps them into the host range.

use gangmem_core::{HostError, NodeSnapshot, ScoreMode, WorkloadUnit};
use tracing::debug;

use crate::error::{PluginError, PluginResult};
use crate::plugin::GangMemPlugin;

/// Dividend for `Least` mode scores.
pub const LEAST_MODE_NUMERATOR: i64 = 100_000_000_000;

/// Raw score for a node with the given memory headroom.
///
/// In `Least` mode a node with zero or negative headroom scores `i64::MAX`
/// instead of dividing by zero, so an over-committed node ranks first.
pub fn memory_score(mode: ScoreMode, headroom: i64) -> i64 {
    match mode {
        ScoreMode::Least if headroom <= 0 => i64::MAX,
        ScoreMode::Least => LEAST_MODE_NUMERATOR / headroom,
        ScoreMode::Most => headroom,
    }
}

impl GangMemPlugin {
    /// Raw score for placing `unit` on `node_id`.
    ///
    /// Stateless and reentrant: the host may call this for many nodes in
    /// parallel. A failure excludes only this node.
    pub fn score(&self, unit: &WorkloadUnit, node_id: &str) -> PluginResult<i64> {
        let node = self
            .handle()
            .nodes()
            .node_resources(node_id)
            .map_err(|e| match e {
                HostError::NotFound(msg) => PluginError::NodeLookup(msg),
                HostError::Unavailable(msg) => PluginError::UpstreamUnavailable(msg),
            })?;

        let headroom = node.headroom();
        let score = memory_score(self.mode(), headroom);
        debug!(
            unit = %unit.name,
            node = %node_id,
            allocatable = node.allocatable_memory,
            requested = node.requested_memory,
            headroom,
            mode = %self.mode(),
            score,
            "node scored"
        );
        Ok(score)
    }
}
