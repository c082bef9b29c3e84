//! Score normalization across all candidate nodes of one unit.
//!
//! ```text
//! if min == max:  score = MaxOut                       (uniform list)
//! else:           score = (raw - min) * (MaxOut - MinOut) / (max - min) + MinOut
//! ```
//!
//! Integer arithmetic with truncating division. Both spans fit in `u64`, so
//! their product always fits in `u128`, even for `i64::MIN..=i64::MAX` bounds.

use gangmem_core::{NodeScore, ScoreBounds, WorkloadUnit};
use tracing::debug;

use crate::plugin::GangMemPlugin;

/// Rescale `scores` in place into `bounds`, preserving relative order.
///
/// An empty list is left untouched.
pub fn normalize_scores(scores: &mut [NodeScore], bounds: ScoreBounds) {
    let Some((min, max)) = score_range(scores) else {
        return;
    };

    if min == max {
        for entry in scores.iter_mut() {
            entry.score = bounds.max_node_score;
        }
        return;
    }

    let raw_range = u128::from(span(min, max));
    let frame_range = u128::from(span(bounds.min_node_score, bounds.max_node_score));
    for entry in scores.iter_mut() {
        let shifted = u128::from(span(min, entry.score));
        // At most `frame_range`, so it fits in u64 and the sum stays within bounds.
        let offset = (shifted * frame_range / raw_range) as u64;
        entry.score = bounds.min_node_score.wrapping_add_unsigned(offset);
    }
}

/// Distance from `lo` up to `hi`, where `lo <= hi`.
fn span(lo: i64, hi: i64) -> u64 {
    hi.abs_diff(lo)
}

fn score_range(scores: &[NodeScore]) -> Option<(i64, i64)> {
    scores.iter().fold(None, |range, entry| match range {
        None => Some((entry.score, entry.score)),
        Some((lo, hi)) => Some((lo.min(entry.score), hi.max(entry.score))),
    })
}

impl GangMemPlugin {
    /// Normalize one unit's raw node scores. Runs once per unit, after every
    /// [`GangMemPlugin::score`] call for it has finished.
    pub fn normalize(&self, unit: &WorkloadUnit, scores: &mut [NodeScore], bounds: ScoreBounds) {
        normalize_scores(scores, bounds);
        debug!(unit = %unit.name, nodes = scores.len(), "scores normalized");
    }
}
