//! One scheduling cycle, played the way the host framework drives the plugin:
//!
//! 1. `admit` the unit once
//! 2. `score` every candidate node on its own blocking task
//! 3. wait for all scores (barrier), dropping nodes whose scoring failed
//! 4. `normalize` the surviving scores once
//! 5. rank nodes by normalized score, best first

use std::collections::HashMap;
use std::sync::Arc;

use gangmem_core::{NodeId, NodeScore, ScoreBounds, WorkloadUnit};
use gangmem_plugin::{Admission, GangMemPlugin, Status};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A node excluded from ranking because its score could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedNode {
    pub node_id: NodeId,
    pub status: Status,
}

/// Result of one unit's scheduling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Admitted and ranked. `ranking[0]` is the selected node.
    Scheduled {
        unit: String,
        ranking: Vec<NodeScore>,
        excluded: Vec<ExcludedNode>,
    },
    Unschedulable {
        unit: String,
        status: Status,
    },
    /// The admission check itself could not run.
    Error {
        unit: String,
        status: Status,
    },
}

impl CycleOutcome {
    pub fn selected_node(&self) -> Option<&str> {
        match self {
            CycleOutcome::Scheduled { ranking, .. } => {
                ranking.first().map(|s| s.node_id.as_str())
            }
            _ => None,
        }
    }
}

/// Run admission, parallel scoring, normalization and ranking for one unit.
pub async fn run_cycle(
    plugin: Arc<GangMemPlugin>,
    unit: WorkloadUnit,
    nodes: Vec<NodeId>,
    bounds: ScoreBounds,
) -> CycleOutcome {
    let unit = Arc::new(unit);

    let admission = {
        let plugin = plugin.clone();
        let unit = unit.clone();
        tokio::task::spawn_blocking(move || plugin.admit(&unit)).await
    };
    match admission {
        Ok(Ok(Admission::Admitted)) => {}
        Ok(Ok(rejected @ Admission::Unschedulable { .. })) => {
            info!(unit = %unit.name, "unit not admitted");
            return CycleOutcome::Unschedulable {
                unit: unit.name.clone(),
                status: rejected.into(),
            };
        }
        Ok(Err(err)) => {
            warn!(unit = %unit.name, error = %err, "admission check failed");
            return CycleOutcome::Error {
                unit: unit.name.clone(),
                status: Status::from(&err),
            };
        }
        Err(join_err) => {
            return CycleOutcome::Error {
                unit: unit.name.clone(),
                status: Status::error(format!("admission task failed: {join_err}")),
            };
        }
    }

    let total = nodes.len();
    let mut tasks = JoinSet::new();
    let mut task_nodes = HashMap::with_capacity(total);
    for node_id in nodes {
        let plugin = plugin.clone();
        let unit = unit.clone();
        let task_node = node_id.clone();
        let handle = tasks.spawn_blocking(move || plugin.score(&unit, &task_node));
        task_nodes.insert(handle.id(), node_id);
    }

    let mut scores = Vec::with_capacity(total);
    let mut excluded = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (task_id, result) = match joined {
            Ok((id, result)) => (id, result.map_err(|err| Status::from(&err))),
            Err(join_err) => (
                join_err.id(),
                Err(Status::error(format!("scoring task failed: {join_err}"))),
            ),
        };
        let Some(node_id) = task_nodes.remove(&task_id) else {
            continue;
        };
        match result {
            Ok(score) => scores.push(NodeScore::new(node_id, score)),
            Err(status) => {
                warn!(unit = %unit.name, node = %node_id, reason = %status.reason, "node excluded from ranking");
                excluded.push(ExcludedNode { node_id, status });
            }
        }
    }

    if scores.is_empty() {
        return CycleOutcome::Unschedulable {
            unit: unit.name.clone(),
            status: Status::unschedulable(format!("0/{total} nodes could be scored")),
        };
    }

    plugin.normalize(&unit, &mut scores, bounds);
    scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.node_id.cmp(&b.node_id)));
    excluded.sort_by(|a, b| a.node_id.cmp(&b.node_id));

    info!(
        unit = %unit.name,
        selected = %scores[0].node_id,
        candidates = scores.len(),
        excluded = excluded.len(),
        "unit ranked"
    );

    CycleOutcome::Scheduled {
        unit: unit.name.clone(),
        ranking: scores,
        excluded,
    }
}
