//! The action forest recorded in a capture.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::provider::ResourceId;

/// Kinds an action can carry. Names are matched case-sensitively.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum ActionFlag {
    /// Clears a render target or depth buffer.
    Clear,
    /// Rasterised draw.
    Drawcall,
    /// Compute dispatch.
    Dispatch,
    /// Mesh shader dispatch.
    MeshDispatch,
    /// Secondary command list execution.
    CmdList,
    /// Single point-in-time marker.
    SetMarker,
    /// Opens a marker region.
    PushMarker,
    /// Closes a marker region.
    PopMarker,
    /// Swapchain present.
    Present,
    /// Multi-draw action.
    MultiAction,
    /// Resource copy.
    Copy,
    /// MSAA resolve.
    Resolve,
    /// Mip generation.
    GenMips,
    /// Render pass boundary.
    PassBoundary,
    /// Ray dispatch.
    DispatchRay,
    /// Acceleration structure build.
    BuildAccStruct,
    /// Indexed draw.
    Indexed,
    /// Instanced draw.
    Instanced,
    /// Draw with automatically computed vertex count.
    Auto,
    /// Indirect draw or dispatch.
    Indirect,
    /// Colour clear.
    ClearColor,
    /// Depth-stencil clear.
    ClearDepthStencil,
    /// Start of a render pass.
    BeginPass,
    /// End of a render pass.
    EndPass,
    /// Command buffer boundary.
    CommandBufferBoundary,
}

impl ActionFlag {
    const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Flag name as shown to clients.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A set of [`ActionFlag`]s.
///
/// Serialised as a list of flag names in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionFlags(u32);

impl ActionFlags {
    /// The empty set.
    pub const NONE: Self = Self(0);

    const MARKERS: Self = Self(
        ActionFlag::PushMarker.bit() | ActionFlag::SetMarker.bit() | ActionFlag::PopMarker.bit(),
    );

    /// Returns true when `flag` is in the set.
    #[must_use]
    pub const fn contains(self, flag: ActionFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Returns true when the sets share at least one flag.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Adds `flag` to the set.
    pub const fn insert(&mut self, flag: ActionFlag) {
        self.0 |= flag.bit();
    }

    /// Returns true when the set contains any marker flag.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        self.intersects(Self::MARKERS)
    }

    /// Iterates the flags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = ActionFlag> {
        ActionFlag::iter().filter(move |flag| self.contains(*flag))
    }

    /// Builds a mask from flag names, silently skipping unknown names.
    #[must_use]
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        names
            .iter()
            .filter_map(|name| name.as_ref().parse::<ActionFlag>().ok())
            .collect()
    }
}

impl FromIterator<ActionFlag> for ActionFlags {
    fn from_iter<I: IntoIterator<Item = ActionFlag>>(iter: I) -> Self {
        let mut flags = Self::NONE;
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl Serialize for ActionFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for flag in self.iter() {
            seq.serialize_element(flag.as_str())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ActionFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = ActionFlags;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a list of action flag names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut flags = ActionFlags::NONE;
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = name
                        .parse::<ActionFlag>()
                        .map_err(|_| de::Error::custom(format!("unknown action flag '{name}'")))?;
                    flags.insert(flag);
                }
                Ok(flags)
            }
        }

        deserializer.deserialize_seq(FlagsVisitor)
    }
}

/// One GPU event and, for markers, the events nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique, strictly increasing event id.
    pub event_id: u32,
    /// Index among non-marker actions.
    #[serde(default)]
    pub action_id: u32,
    /// Display name.
    pub name: String,
    /// Kinds of the event.
    #[serde(default)]
    pub flags: ActionFlags,
    /// Index (or vertex) count.
    #[serde(default)]
    pub num_indices: u32,
    /// Instance count.
    #[serde(default)]
    pub num_instances: u32,
    /// First vertex read.
    #[serde(default)]
    pub vertex_offset: u32,
    /// First index read.
    #[serde(default)]
    pub index_offset: u32,
    /// Value added to each index.
    #[serde(default)]
    pub base_vertex: i32,
    /// First instance.
    #[serde(default)]
    pub instance_offset: u32,
    /// Thread group counts of a dispatch.
    #[serde(default)]
    pub dispatch_dimension: [u32; 3],
    /// Colour outputs written.
    #[serde(default)]
    pub outputs: Vec<ResourceId>,
    /// Depth output written.
    #[serde(default)]
    pub depth_out: Option<ResourceId>,
    /// Nested actions in execution order.
    #[serde(default)]
    pub children: Vec<Self>,
}

impl Action {
    /// Returns true for push, set and pop markers.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        self.flags.is_marker()
    }

    /// Returns true when the action carries `flag`.
    #[must_use]
    pub const fn has_flag(&self, flag: ActionFlag) -> bool {
        self.flags.contains(flag)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for small action forests.

    use super::{Action, ActionFlag, ActionFlags};

    pub(crate) fn action(event_id: u32, name: &str, flags: &[ActionFlag]) -> Action {
        Action {
            event_id,
            action_id: event_id,
            name: name.to_owned(),
            flags: flags.iter().copied().collect(),
            num_indices: 0,
            num_instances: 1,
            vertex_offset: 0,
            index_offset: 0,
            base_vertex: 0,
            instance_offset: 0,
            dispatch_dimension: [0; 3],
            outputs: Vec::new(),
            depth_out: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn marker(event_id: u32, name: &str, children: Vec<Action>) -> Action {
        Action {
            children,
            ..action(event_id, name, &[ActionFlag::PushMarker])
        }
    }

    pub(crate) fn draw(event_id: u32, name: &str) -> Action {
        Action {
            num_indices: 36,
            ..action(event_id, name, &[ActionFlag::Drawcall, ActionFlag::Indexed])
        }
    }

    pub(crate) fn dispatch(event_id: u32, name: &str) -> Action {
        Action {
            dispatch_dimension: [8, 8, 1],
            ..action(event_id, name, &[ActionFlag::Dispatch])
        }
    }

    /// `Shadow Pass` (10) holding a draw, `Main Pass` (20) holding a draw and
    /// a dispatch.
    pub(crate) fn two_pass_frame() -> Vec<Action> {
        vec![
            marker(10, "Shadow Pass", vec![draw(11, "Draw shadow casters")]),
            marker(
                20,
                "Main Pass",
                vec![draw(21, "Draw opaque"), dispatch(22, "Light culling")],
            ),
        ]
    }

    pub(crate) fn flags(names: &[ActionFlag]) -> ActionFlags {
        names.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fixtures::flags;
    use super::*;

    #[test]
    fn flags_serialise_in_declaration_order() {
        let set = flags(&[ActionFlag::Indexed, ActionFlag::Drawcall]);
        let value = serde_json::to_value(set).expect("serialise");
        assert_eq!(value, json!(["Drawcall", "Indexed"]));
    }

    #[test]
    fn unknown_names_are_skipped_when_building_masks() {
        let mask = ActionFlags::from_names(&["Dispatch", "drawcall", "Bogus"]);
        assert_eq!(mask, flags(&[ActionFlag::Dispatch]));
        assert_eq!(ActionFlags::from_names(&["Bogus"]), ActionFlags::NONE);
    }

    #[test]
    fn marker_detection_covers_all_marker_kinds() {
        for flag in [ActionFlag::PushMarker, ActionFlag::SetMarker, ActionFlag::PopMarker] {
            assert!(flags(&[flag]).is_marker());
        }
        assert!(!flags(&[ActionFlag::Drawcall]).is_marker());
    }

    #[test]
    fn actions_deserialise_with_defaults() {
        let action: Action = serde_json::from_value(json!({
            "event_id": 5,
            "name": "Draw",
            "flags": ["Drawcall"],
            "outputs": ["ResourceId::3"]
        }))
        .expect("deserialise");
        assert!(action.has_flag(ActionFlag::Drawcall));
        assert_eq!(action.outputs, [ResourceId::new(3)]);
        assert!(action.children.is_empty());
    }

    #[test]
    fn unknown_flags_fail_deserialisation() {
        let result = serde_json::from_value::<Action>(json!({
            "event_id": 1,
            "name": "x",
            "flags": ["drawcall"]
        }));
        assert!(result.is_err());
    }
}
