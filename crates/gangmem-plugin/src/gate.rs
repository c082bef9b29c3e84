//! Admission gate — gang-style pre-filter.
//!
//! A unit may proceed to node ranking only once its group has at least
//! `minAvailable` members visible in the host's unit listing. The group and
//! threshold are read from the unit's own labels and converted into a typed
//! [`GangRequest`] once, at entry.
//!
//! The threshold is declared per unit, not per group: two units of the same
//! group may carry different `minAvailable` values, and each is judged by
//! its own. The group count is a point-in-time read that can race with
//! other units' admissions.

use std::collections::BTreeMap;

use gangmem_core::{
    GROUP_LABEL, HostError, LabelSelector, MIN_AVAILABLE_LABEL, UnitLister, WorkloadUnit,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::plugin::GangMemPlugin;

/// Validation failures at the label boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("missing minAvailable label")]
    MissingMinAvailable,

    #[error("invalid minAvailable value {value:?}: {reason}")]
    InvalidMinAvailable { value: String, reason: String },
}

/// Typed view of a unit's gang labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GangRequest {
    /// Group identifier. Empty when the label is absent.
    pub group: String,
    pub min_available: u64,
}

impl GangRequest {
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Result<Self, LabelError> {
        let group = labels.get(GROUP_LABEL).cloned().unwrap_or_default();
        let raw = labels
            .get(MIN_AVAILABLE_LABEL)
            .ok_or(LabelError::MissingMinAvailable)?;
        // Surrounding whitespace is not stripped; " 3 " is rejected.
        let min_available = raw.parse::<u64>().map_err(|e| LabelError::InvalidMinAvailable {
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            group,
            min_available,
        })
    }

    pub fn selector(&self) -> LabelSelector {
        LabelSelector::equals(GROUP_LABEL, self.group.as_str())
    }

    /// Decide admission given the observed group size.
    pub fn decide(&self, group_size: usize) -> Admission {
        if (group_size as u64) < self.min_available {
            Admission::Unschedulable {
                reason: format!(
                    "group '{}' has only {} units, but needs {}",
                    self.group, group_size, self.min_available
                ),
            }
        } else {
            Admission::Admitted
        }
    }
}

/// Outcome of a gate check that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// A normal negative decision, not an error.
    Unschedulable { reason: String },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

impl GangMemPlugin {
    /// Pre-filter a unit against its group's live membership count.
    ///
    /// Reads only; safe to abandon mid-flight.
    pub fn admit(&self, unit: &WorkloadUnit) -> PluginResult<Admission> {
        let request = GangRequest::from_labels(&unit.labels)?;
        if request.group.is_empty() {
            warn!(
                unit = %unit.name,
                "unit has no podGroup label; counting every ungrouped unit as its group"
            );
        }

        let members = self
            .handle()
            .units()
            .list(&request.selector())
            .map_err(|e| match e {
                HostError::Unavailable(msg) | HostError::NotFound(msg) => {
                    PluginError::UpstreamUnavailable(format!("failed to list units: {msg}"))
                }
            })?;

        let admission = request.decide(members.len());
        debug!(
            unit = %unit.name,
            group = %request.group,
            group_size = members.len(),
            min_available = request.min_available,
            admitted = admission.is_admitted(),
            "admission decided"
        );
        Ok(admission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gangmem_core::{NodeResourceState, NodeSnapshot, ScoreMode};
    use gangmem_state::StateStore;

    use crate::plugin::Handle;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn gang_unit(name: &str, group: &str, min: &str) -> WorkloadUnit {
        WorkloadUnit::new(name)
            .with_label(GROUP_LABEL, group)
            .with_label(MIN_AVAILABLE_LABEL, min)
    }

    fn plugin_with(store: &StateStore) -> GangMemPlugin {
        let handle = Handle::new(Arc::new(store.clone()), Arc::new(store.clone()));
        GangMemPlugin::with_mode(ScoreMode::Least, handle)
    }

    struct BrokenLister;

    impl UnitLister for BrokenLister {
        fn list(&self, _: &LabelSelector) -> Result<Vec<WorkloadUnit>, HostError> {
            Err(HostError::Unavailable("informer not synced".to_string()))
        }
    }

    impl NodeSnapshot for BrokenLister {
        fn node_resources(&self, node_id: &str) -> Result<NodeResourceState, HostError> {
            Err(HostError::NotFound(node_id.to_string()))
        }
    }

    // ── Label boundary ─────────────────────────────────────────────

    #[test]
    fn parses_group_and_threshold() {
        let req = GangRequest::from_labels(&labels(&[
            (GROUP_LABEL, "A"),
            (MIN_AVAILABLE_LABEL, "3"),
        ]))
        .unwrap();
        assert_eq!(req.group, "A");
        assert_eq!(req.min_available, 3);
    }

    #[test]
    fn missing_group_is_empty() {
        let req = GangRequest::from_labels(&labels(&[(MIN_AVAILABLE_LABEL, "0")])).unwrap();
        assert_eq!(req.group, "");
    }

    #[test]
    fn rejects_non_numeric_threshold() {
        let err = GangRequest::from_labels(&labels(&[(MIN_AVAILABLE_LABEL, "abc")])).unwrap_err();
        assert!(matches!(err, LabelError::InvalidMinAvailable { ref value, .. } if value == "abc"));
    }

    #[test]
    fn rejects_negative_threshold() {
        let err = GangRequest::from_labels(&labels(&[(MIN_AVAILABLE_LABEL, "-1")])).unwrap_err();
        assert!(matches!(err, LabelError::InvalidMinAvailable { .. }));
    }

    #[test]
    fn rejects_padded_threshold() {
        for raw in [" 3", "3 ", " 3 ", "3\n"] {
            let err = GangRequest::from_labels(&labels(&[(MIN_AVAILABLE_LABEL, raw)])).unwrap_err();
            assert!(matches!(err, LabelError::InvalidMinAvailable { ref value, .. } if value == raw));
        }
    }

    #[test]
    fn accepts_threshold_beyond_u32() {
        let req = GangRequest::from_labels(&labels(&[
            (GROUP_LABEL, "A"),
            (MIN_AVAILABLE_LABEL, "5000000000"),
        ]))
        .unwrap();
        assert_eq!(req.min_available, 5_000_000_000);
        assert!(!req.decide(4_999_999).is_admitted());
    }

    #[test]
    fn admit_padded_threshold_is_config_error() {
        let store = StateStore::open_in_memory().unwrap();
        let plugin = plugin_with(&store);

        let err = plugin.admit(&gang_unit("a-0", "A", " 3 ")).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn rejects_missing_threshold() {
        let err = GangRequest::from_labels(&labels(&[(GROUP_LABEL, "A")])).unwrap_err();
        assert_eq!(err, LabelError::MissingMinAvailable);
    }

    // ── Decision rule ──────────────────────────────────────────────

    #[test]
    fn unschedulable_iff_group_below_threshold() {
        for min in 0..6u64 {
            let req = GangRequest {
                group: "g".to_string(),
                min_available: min,
            };
            for size in 0..6usize {
                let admitted = req.decide(size).is_admitted();
                assert_eq!(admitted, size as u64 >= min, "size={size} min={min}");
            }
        }
    }

    #[test]
    fn reason_names_group_size_and_threshold() {
        let req = GangRequest {
            group: "A".to_string(),
            min_available: 3,
        };
        match req.decide(2) {
            Admission::Unschedulable { reason } => {
                assert!(reason.contains("'A'"));
                assert!(reason.contains('2'));
                assert!(reason.contains('3'));
            }
            Admission::Admitted => panic!("expected unschedulable"),
        }
    }

    // ── admit() against a store ────────────────────────────────────

    #[test]
    fn admit_waits_for_group() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_unit(&gang_unit("a-0", "A", "3")).unwrap();
        store.put_unit(&gang_unit("a-1", "A", "3")).unwrap();
        store.put_unit(&gang_unit("b-0", "B", "1")).unwrap();
        let plugin = plugin_with(&store);

        let unit = store.get_unit("a-0").unwrap().unwrap();
        let outcome = plugin.admit(&unit).unwrap();
        assert!(!outcome.is_admitted());

        store.put_unit(&gang_unit("a-2", "A", "3")).unwrap();
        assert!(plugin.admit(&unit).unwrap().is_admitted());
    }

    #[test]
    fn admit_uses_evaluated_units_threshold() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_unit(&gang_unit("a-0", "A", "1")).unwrap();
        store.put_unit(&gang_unit("a-1", "A", "5")).unwrap();
        let plugin = plugin_with(&store);

        let lenient = store.get_unit("a-0").unwrap().unwrap();
        let strict = store.get_unit("a-1").unwrap().unwrap();
        assert!(plugin.admit(&lenient).unwrap().is_admitted());
        assert!(!plugin.admit(&strict).unwrap().is_admitted());
    }

    #[test]
    fn admit_bad_label_is_config_error() {
        let store = StateStore::open_in_memory().unwrap();
        let plugin = plugin_with(&store);
        let unit = gang_unit("a-0", "A", "abc");

        let err = plugin.admit(&unit).unwrap_err();
        assert!(matches!(err, PluginError::Config(_)));
    }

    #[test]
    fn admit_listing_failure_is_upstream_error() {
        let broken = Arc::new(BrokenLister);
        let plugin = GangMemPlugin::with_mode(ScoreMode::Most, Handle::new(broken.clone(), broken));

        let err = plugin.admit(&gang_unit("a-0", "A", "1")).unwrap_err();
        assert!(matches!(err, PluginError::UpstreamUnavailable(_)));
    }

    #[test]
    fn admit_counts_ungrouped_units_together() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_unit(&WorkloadUnit::new("x").with_label(MIN_AVAILABLE_LABEL, "2")).unwrap();
        store.put_unit(&WorkloadUnit::new("y")).unwrap();
        let plugin = plugin_with(&store);

        let unit = store.get_unit("x").unwrap().unwrap();
        assert!(plugin.admit(&unit).unwrap().is_admitted());
    }
}
