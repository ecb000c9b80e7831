//! Whole-frame statistics.

use serde::Serialize;

use super::model::{Action, ActionFlag};

/// Number of textures and buffers in the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResourceCounts {
    /// Texture count.
    pub textures: usize,
    /// Buffer count.
    pub buffers: usize,
}

/// Per-kind action counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    /// Actions flagged `Drawcall`.
    pub draw_calls: usize,
    /// Actions flagged `Dispatch`.
    pub dispatches: usize,
    /// Actions flagged `Clear`.
    pub clears: usize,
    /// Actions flagged `Copy`.
    pub copies: usize,
    /// Actions flagged `Present`.
    pub presents: usize,
    /// Push, set and pop markers.
    pub markers: usize,
}

/// A push marker at the root of the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopLevelMarker {
    /// Marker name.
    pub name: String,
    /// Marker event id.
    pub event_id: u32,
    /// Number of actions nested under the marker at any depth.
    pub child_count: usize,
}

/// Result of `get_frame_summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    /// Graphics API of the capture.
    pub api: String,
    /// Every action in the forest, markers included.
    pub total_actions: usize,
    /// Per-kind counts.
    pub statistics: Statistics,
    /// Root push markers.
    pub top_level_markers: Vec<TopLevelMarker>,
    /// Resource totals.
    pub resource_counts: ResourceCounts,
}

/// Summarises `forest`.
#[must_use]
pub fn summarise(api: &str, forest: &[Action], resource_counts: ResourceCounts) -> FrameSummary {
    let mut statistics = Statistics::default();
    let total_actions = tally(forest, &mut statistics);
    let top_level_markers = forest
        .iter()
        .filter(|action| action.has_flag(ActionFlag::PushMarker))
        .map(|action| TopLevelMarker {
            name: action.name.clone(),
            event_id: action.event_id,
            child_count: descendant_count(&action.children),
        })
        .collect();

    FrameSummary {
        api: api.to_owned(),
        total_actions,
        statistics,
        top_level_markers,
        resource_counts,
    }
}

fn tally(actions: &[Action], statistics: &mut Statistics) -> usize {
    let mut total = 0;
    for action in actions {
        total += 1;
        let counters = [
            (ActionFlag::Drawcall, &mut statistics.draw_calls),
            (ActionFlag::Dispatch, &mut statistics.dispatches),
            (ActionFlag::Clear, &mut statistics.clears),
            (ActionFlag::Copy, &mut statistics.copies),
            (ActionFlag::Present, &mut statistics.presents),
        ];
        for (flag, counter) in counters {
            if action.has_flag(flag) {
                *counter += 1;
            }
        }
        if action.is_marker() {
            statistics.markers += 1;
        }
        total += tally(&action.children, statistics);
    }
    total
}

fn descendant_count(actions: &[Action]) -> usize {
    actions
        .iter()
        .map(|action| 1 + descendant_count(&action.children))
        .sum()
}
