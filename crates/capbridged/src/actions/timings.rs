//! GPU durations joined onto leaf actions.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::ActionFilter;
use super::model::Action;

const UNSUPPORTED_MESSAGE: &str = "GPU duration counters are not available for this capture";

/// Duration of one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionTiming {
    /// Event id.
    pub event_id: u32,
    /// Action name.
    pub name: String,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Duration in milliseconds.
    pub duration_ms: f64,
}

/// Result of `get_action_timings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionTimings {
    /// Whether the provider supports duration counters.
    pub available: bool,
    /// Unit of the raw counter values.
    pub unit: &'static str,
    /// Per-action durations in execution order.
    pub timings: Vec<ActionTiming>,
    /// Sum of all reported durations.
    pub total_duration_ms: f64,
    /// Number of timings reported.
    pub count: usize,
    /// Explanation when counters are unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl ActionTimings {
    /// Result reported when the provider has no duration counters.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            available: false,
            unit: "seconds",
            timings: Vec::new(),
            total_duration_ms: 0.0,
            count: 0,
            message: Some(UNSUPPORTED_MESSAGE),
        }
    }
}

/// Collects the non-marker actions of `forest` that fall inside the marker
/// scope of `filter`, in execution order.
///
/// Only `exclude_markers` and `marker_filter` are consulted.
#[must_use]
pub fn scoped_leaves<'a>(forest: &'a [Action], filter: &ActionFilter) -> Vec<&'a Action> {
    let mut leaves = Vec::new();
    collect(forest, filter, false, &mut leaves);
    leaves
}

fn collect<'a>(
    actions: &'a [Action],
    filter: &ActionFilter,
    in_matching: bool,
    leaves: &mut Vec<&'a Action>,
) {
    for action in actions {
        if filter.is_excluded(action) {
            continue;
        }
        let matching = in_matching || filter.opens_match(action);
        if !action.is_marker() && filter.in_scope(matching) {
            leaves.push(action);
        }
        collect(&action.children, filter, matching, leaves);
    }
}

/// Joins the scoped leaves with `durations` (seconds keyed by event id).
///
/// When `event_ids` is given only those events are reported. Leaves without
/// a counter sample are omitted.
#[expect(
    clippy::float_arithmetic,
    reason = "durations are converted to milliseconds and summed"
)]
#[must_use]
pub fn action_timings(
    forest: &[Action],
    filter: &ActionFilter,
    event_ids: Option<&[u32]>,
    durations: &BTreeMap<u32, f64>,
) -> ActionTimings {
    let timings: Vec<ActionTiming> = scoped_leaves(forest, filter)
        .into_iter()
        .filter(|action| event_ids.is_none_or(|wanted| wanted.contains(&action.event_id)))
        .filter_map(|action| {
            durations.get(&action.event_id).map(|seconds| ActionTiming {
                event_id: action.event_id,
                name: action.name.clone(),
                duration_seconds: *seconds,
                duration_ms: seconds * 1000.0,
            })
        })
        .collect();
    let total_duration_ms = timings.iter().map(|timing| timing.duration_ms).sum();

    ActionTimings {
        available: true,
        unit: "seconds",
        count: timings.len(),
        timings,
        total_duration_ms,
        message: None,
    }
}
