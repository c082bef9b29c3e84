//! Host collaborator interfaces.
//!
//! The scheduler framework owns the unit informer cache and the node
//! snapshot. The plugin only sees them through these two traits, which the
//! host (or `gangmem-state` in standalone runs) implements.

use thiserror::Error;

use crate::types::{LabelSelector, NodeResourceState, WorkloadUnit};

/// Failures reported by host-side listers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The listing or snapshot could not be read at all.
    #[error("host listing unavailable: {0}")]
    Unavailable(String),

    /// The requested object does not exist in the snapshot.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Live listing of workload units, filtered by label selector.
pub trait UnitLister: Send + Sync {
    fn list(&self, selector: &LabelSelector) -> Result<Vec<WorkloadUnit>, HostError>;
}

/// Per-node resource snapshot, valid for one scoring pass.
pub trait NodeSnapshot: Send + Sync {
    fn node_resources(&self, node_id: &str) -> Result<NodeResourceState, HostError>;
}
