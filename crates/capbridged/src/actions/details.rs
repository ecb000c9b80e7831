//! Lookup of a single action by event id.

use serde::Serialize;

use super::model::{Action, ActionFlags};
use crate::provider::{ProviderError, ResourceId};

/// Result of `get_draw_call_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDetails<'a> {
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
    /// First vertex read.
    pub vertex_offset: u32,
    /// First index read.
    pub index_offset: u32,
    /// Value added to each index.
    pub base_vertex: i32,
    /// First instance.
    pub instance_offset: u32,
    /// Thread group counts.
    pub dispatch_dimension: [u32; 3],
    /// Colour outputs written.
    pub outputs: &'a [ResourceId],
    /// Depth output written.
    pub depth_output: Option<ResourceId>,
    /// Direct children of the action.
    pub child_count: usize,
    /// Names of the enclosing markers, outermost first.
    pub marker_path: Vec<&'a str>,
}

/// Finds `event_id` anywhere in `forest` together with its marker path.
#[must_use]
pub fn find_action(forest: &[Action], event_id: u32) -> Option<(&Action, Vec<&str>)> {
    let mut path = Vec::new();
    search(forest, event_id, &mut path).map(|action| (action, path))
}

fn search<'a>(actions: &'a [Action], event_id: u32, path: &mut Vec<&'a str>) -> Option<&'a Action> {
    for action in actions {
        if action.event_id == event_id {
            return Some(action);
        }
        let pushed = action.is_marker();
        if pushed {
            path.push(&action.name);
        }
        if let Some(found) = search(&action.children, event_id, path) {
            return Some(found);
        }
        if pushed {
            path.pop();
        }
    }
    None
}

/// Describes the action with `event_id`.
///
/// # Errors
///
/// Returns [`ProviderError::EventNotFound`] when no action has that id.
pub fn action_details(forest: &[Action], event_id: u32) -> Result<ActionDetails<'_>, ProviderError> {
    let (action, marker_path) =
        find_action(forest, event_id).ok_or(ProviderError::EventNotFound { event_id })?;
    Ok(ActionDetails {
        event_id: action.event_id,
        action_id: action.action_id,
        name: &action.name,
        flags: action.flags,
        num_indices: action.num_indices,
        num_instances: action.num_instances,
        vertex_offset: action.vertex_offset,
        index_offset: action.index_offset,
        base_vertex: action.base_vertex,
        instance_offset: action.instance_offset,
        dispatch_dimension: action.dispatch_dimension,
        outputs: &action.outputs,
        depth_output: action.depth_out,
        child_count: action.children.len(),
        marker_path,
    })
}
