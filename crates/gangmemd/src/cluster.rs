//! Cluster description file: the units and node snapshots a cycle runs against.
//!
//! ```toml
//! [[nodes]]
//! id = "node-a"
//! allocatable = "8Gi"
//! requested = "2Gi"
//!
//! [[units]]
//! name = "web-0"
//! labels = { podGroup = "A", minAvailable = "3" }
//! ```

use std::path::Path;

use anyhow::Context;
use gangmem_core::{NodeResourceState, WorkloadUnit, parse_memory_quantity};
use gangmem_state::StateStore;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub units: Vec<WorkloadUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub allocatable: Quantity,
    #[serde(default)]
    pub requested: Quantity,
}

/// A memory amount written either as plain bytes or with a unit suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Bytes(i64),
    Text(String),
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Bytes(0)
    }
}

impl Quantity {
    pub fn bytes(&self) -> anyhow::Result<i64> {
        match self {
            Quantity::Bytes(b) => Ok(*b),
            Quantity::Text(s) => Ok(parse_memory_quantity(s)?),
        }
    }
}

impl NodeSpec {
    pub fn to_resource_state(&self) -> anyhow::Result<NodeResourceState> {
        Ok(NodeResourceState {
            node_id: self.id.clone(),
            allocatable_memory: self
                .allocatable
                .bytes()
                .with_context(|| format!("node {}: allocatable", self.id))?,
            requested_memory: self
                .requested
                .bytes()
                .with_context(|| format!("node {}: requested", self.id))?,
        })
    }
}

impl ClusterSpec {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading cluster file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write every node and unit into the store, replacing same-named entries.
    pub fn load_into(&self, store: &StateStore) -> anyhow::Result<()> {
        for node in &self.nodes {
            store.put_node(&node.to_resource_state()?)?;
        }
        for unit in &self.units {
            store.put_unit(unit)?;
        }
        info!(
            nodes = self.nodes.len(),
            units = self.units.len(),
            "cluster description loaded"
        );
        Ok(())
    }
}
