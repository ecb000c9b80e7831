//! Filtering of the action forest.
//!
//! A single depth-first walk prunes the forest by marker name, event range and
//! flags while keeping sibling order and nesting. The only state carried
//! downward is whether the walk is inside a push marker whose name matched
//! `marker_filter`.

use serde::Serialize;

use super::model::{Action, ActionFlag, ActionFlags};

/// Criteria applied by [`filter_actions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFilter {
    /// Walk into children; when false only top-level leaves can be emitted.
    pub include_children: bool,
    /// Only emit actions inside a push marker whose name contains this text.
    pub marker_filter: Option<String>,
    /// Drop markers (with their subtrees) whose name contains any of these.
    pub exclude_markers: Vec<String>,
    /// Lowest event id a leaf may have. Negative bounds are accepted; a
    /// negative minimum admits every leaf.
    pub event_id_min: Option<i64>,
    /// Highest event id a leaf may have; a negative maximum admits none.
    pub event_id_max: Option<i64>,
    /// Splice marker children into the marker's parent.
    pub only_actions: bool,
    /// Leaves must carry at least one of these flags.
    pub flags: Option<ActionFlags>,
}

impl Default for ActionFilter {
    fn default() -> Self {
        Self {
            include_children: true,
            marker_filter: None,
            exclude_markers: Vec::new(),
            event_id_min: None,
            event_id_max: None,
            only_actions: false,
            flags: None,
        }
    }
}

impl ActionFilter {
    pub(crate) fn is_excluded(&self, action: &Action) -> bool {
        action.is_marker()
            && self
                .exclude_markers
                .iter()
                .any(|pattern| action.name.contains(pattern.as_str()))
    }

    /// Whether entering `action` puts the walk inside a matching marker.
    pub(crate) fn opens_match(&self, action: &Action) -> bool {
        action.has_flag(ActionFlag::PushMarker)
            && self
                .marker_filter
                .as_deref()
                .is_some_and(|needle| action.name.contains(needle))
    }

    pub(crate) const fn in_scope(&self, in_matching: bool) -> bool {
        self.marker_filter.is_none() || in_matching
    }

    fn in_range(&self, event_id: u32) -> bool {
        let id = i64::from(event_id);
        self.event_id_min.is_none_or(|min| id >= min)
            && self.event_id_max.is_none_or(|max| id <= max)
    }

    fn passes_flags(&self, action: &Action) -> bool {
        self.flags.is_none_or(|mask| action.flags.intersects(mask))
    }
}

/// An action that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionNode<'a> {
    /// Event id.
    pub event_id: u32,
    /// Action id.
    pub action_id: u32,
    /// Display name.
    pub name: &'a str,
    /// Kinds of the event.
    pub flags: ActionFlags,
    /// Index count.
    pub num_indices: u32,
    /// Instance count.
    pub num_instances: u32,
    /// Surviving children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl<'a> ActionNode<'a> {
    fn new(action: &'a Action, children: Vec<Self>) -> Self {
        Self {
            event_id: action.event_id,
            action_id: action.action_id,
            name: &action.name,
            flags: action.flags,
            num_indices: action.num_indices,
            num_instances: action.num_instances,
            children,
        }
    }
}

/// Filters `forest` with `filter`, returning the surviving roots.
#[must_use]
pub fn filter_actions<'a>(forest: &'a [Action], filter: &ActionFilter) -> Vec<ActionNode<'a>> {
    let mut output = Vec::new();
    filter_level(forest, filter, false, &mut output);
    output
}

fn filter_level<'a>(
    actions: &'a [Action],
    filter: &ActionFilter,
    in_matching: bool,
    output: &mut Vec<ActionNode<'a>>,
) {
    for action in actions {
        if filter.is_excluded(action) {
            continue;
        }
        let matching = in_matching || filter.opens_match(action);
        let marker = action.is_marker();

        if marker && filter.only_actions {
            if filter.include_children {
                filter_level(&action.children, filter, matching, output);
            }
            continue;
        }

        if !marker && !filter.passes_flags(action) {
            continue;
        }

        let mut children = Vec::new();
        if filter.include_children {
            filter_level(&action.children, filter, matching, &mut children);
        }

        let included = if marker {
            !children.is_empty() && filter.in_scope(matching)
        } else {
            filter.in_range(action.event_id) && filter.in_scope(matching)
        };
        if included {
            output.push(ActionNode::new(action, children));
        }
    }
}
