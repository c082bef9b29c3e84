//! Shared types used across gangmem crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a node in the cluster.
pub type NodeId = String;

/// Label carrying the group a unit is co-scheduled with.
pub const GROUP_LABEL: &str = "podGroup";

/// Label carrying the minimum group size a unit waits for.
pub const MIN_AVAILABLE_LABEL: &str = "minAvailable";

// ── Workload units ────────────────────────────────────────────────

/// A schedulable entity (pod-equivalent). Owned by the host; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadUnit {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl WorkloadUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Builder-style label insertion.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Exact-match label selector.
///
/// An absent label is treated as the empty value, so `podGroup=""` selects
/// every unit that carries no group label at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector requiring a single `key=value` match.
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().and(key, value)
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|(k, v)| labels.get(k).map(String::as_str).unwrap_or("") == v)
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .requirements
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

// ── Nodes ─────────────────────────────────────────────────────────

/// Memory state of a node as seen by one scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeResourceState {
    pub node_id: NodeId,
    /// Allocatable memory in bytes.
    pub allocatable_memory: i64,
    /// Memory already requested by units bound to this node, in bytes.
    pub requested_memory: i64,
}

impl NodeResourceState {
    /// Allocatable minus requested. Not clamped: inconsistent host
    /// bookkeeping can make this zero or negative.
    pub fn headroom(&self) -> i64 {
        self.allocatable_memory.saturating_sub(self.requested_memory)
    }
}

/// A (node, score) pair as exchanged with the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeScore {
    pub node_id: NodeId,
    pub score: i64,
}

impl NodeScore {
    pub fn new(node_id: impl Into<NodeId>, score: i64) -> Self {
        Self {
            node_id: node_id.into(),
            score,
        }
    }
}

pub type NodeScoreList = Vec<NodeScore>;

// ── Score mode ────────────────────────────────────────────────────

/// Scoring policy direction, fixed at plugin construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoreMode {
    /// Favor nodes with the least headroom (bin-packing).
    #[default]
    Least,
    /// Favor nodes with the most headroom (spreading).
    Most,
}

impl ScoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::Least => "Least",
            ScoreMode::Most => "Most",
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode string is neither `Least` nor `Most`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mode, got {0:?}")]
pub struct InvalidScoreMode(pub String);

impl FromStr for ScoreMode {
    type Err = InvalidScoreMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Least" => Ok(ScoreMode::Least),
            "Most" => Ok(ScoreMode::Most),
            other => Err(InvalidScoreMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_mode_parses_exact_names() {
        assert_eq!("Least".parse::<ScoreMode>(), Ok(ScoreMode::Least));
        assert_eq!("Most".parse::<ScoreMode>(), Ok(ScoreMode::Most));
        assert!("least".parse::<ScoreMode>().is_err());
        assert!("".parse::<ScoreMode>().is_err());
        assert_eq!(ScoreMode::default(), ScoreMode::Least);
    }

    #[test]
    fn headroom_may_go_negative() {
        let node = NodeResourceState {
            node_id: "n1".to_string(),
            allocatable_memory: 1024,
            requested_memory: 2048,
        };
        assert_eq!(node.headroom(), -1024);
    }

    #[test]
    fn selector_matches_exact_value() {
        let unit = WorkloadUnit::new("a").with_label(GROUP_LABEL, "A");
        assert!(LabelSelector::equals(GROUP_LABEL, "A").matches(&unit.labels));
        assert!(!LabelSelector::equals(GROUP_LABEL, "B").matches(&unit.labels));
    }

    #[test]
    fn selector_treats_missing_label_as_empty() {
        let unlabeled = WorkloadUnit::new("a");
        let labeled = WorkloadUnit::new("b").with_label(GROUP_LABEL, "A");
        let selector = LabelSelector::equals(GROUP_LABEL, "");
        assert!(selector.matches(&unlabeled.labels));
        assert!(!selector.matches(&labeled.labels));
    }

    #[test]
    fn selector_display() {
        let selector = LabelSelector::equals("a", "1").and("b", "2");
        assert_eq!(selector.to_string(), "a=1,b=2");
    }
}
