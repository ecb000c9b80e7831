//! Pipeline state at a single event.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::provider::{
    BoundResource, CaptureProvider, ConstantBlock, ProviderError, ResourceId, SamplerBinding,
    ShaderStage, TextureDesc, Viewport,
};

/// Texture properties attached to a binding when the resource is a texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureDetails {
    /// Width of mip 0.
    pub width: u32,
    /// Height of mip 0.
    pub height: u32,
    /// Pixel format.
    pub format: String,
}

impl From<&TextureDesc> for TextureDetails {
    fn from(texture: &TextureDesc) -> Self {
        Self {
            width: texture.width,
            height: texture.height,
            format: texture.format.clone(),
        }
    }
}

/// A resource bound to a shader slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    /// Binding slot.
    pub slot: u32,
    /// Name declared by the shader.
    pub name: String,
    /// Bound resource.
    pub resource_id: ResourceId,
    /// Declared type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Texture properties, present for textures only.
    #[serde(flatten)]
    pub texture: Option<TextureDetails>,
}

/// State of one programmable stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageState {
    /// Shader id.
    pub resource_id: ResourceId,
    /// Entry point name.
    pub entry_point: String,
    /// Read-only resources.
    pub resources: Vec<ResourceState>,
    /// Read-write resources.
    pub uavs: Vec<ResourceState>,
    /// Samplers.
    pub samplers: Vec<SamplerBinding>,
    /// Constant blocks.
    pub constant_buffers: Vec<ConstantBlock>,
}

/// A bound colour output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetState {
    /// Output index.
    pub index: u32,
    /// Bound resource.
    pub resource_id: ResourceId,
    /// Resource debug name.
    pub name: String,
    /// Texture properties.
    #[serde(flatten)]
    pub texture: Option<TextureDetails>,
}

/// Fixed-function input assembly state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputAssembly {
    /// Primitive topology.
    pub topology: String,
}

/// Result of `get_pipeline_state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    /// Event queried.
    pub event_id: u32,
    /// Graphics API of the capture.
    pub api: String,
    /// Bound stages keyed by stage name.
    pub shaders: BTreeMap<ShaderStage, StageState>,
    /// Active viewports.
    pub viewports: Vec<Viewport>,
    /// Colour outputs.
    pub render_targets: Vec<TargetState>,
    /// Depth-stencil output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_target: Option<TargetState>,
    /// Input assembly.
    pub input_assembly: InputAssembly,
}

/// Describes the pipeline bound at `event_id`.
///
/// # Errors
///
/// Fails when no capture is loaded or the event does not exist.
pub fn pipeline_state(
    provider: &mut dyn CaptureProvider,
    event_id: u32,
) -> Result<PipelineState, ProviderError> {
    let api = provider
        .capture()
        .map(|info| info.api)
        .ok_or(ProviderError::NoCaptureLoaded)?;
    let bindings = provider.bindings(event_id)?;
    let textures: BTreeMap<ResourceId, TextureDesc> = provider
        .textures()?
        .into_iter()
        .map(|texture| (texture.resource_id, texture))
        .collect();
    let details = |id: ResourceId| textures.get(&id).map(TextureDetails::from);
    let resource = |bound: BoundResource| ResourceState {
        texture: details(bound.resource_id),
        slot: bound.slot,
        name: bound.name,
        resource_id: bound.resource_id,
        resource_type: bound.resource_type,
    };
    let target = |index: u32, resource_id: ResourceId| TargetState {
        index,
        resource_id,
        name: provider.resource_name(resource_id).unwrap_or_default(),
        texture: details(resource_id),
    };

    let shaders = bindings
        .shaders
        .into_iter()
        .map(|shader| {
            let state = StageState {
                resource_id: shader.resource_id,
                entry_point: shader.entry_point,
                resources: shader.read_only.into_iter().map(resource).collect(),
                uavs: shader.read_write.into_iter().map(resource).collect(),
                samplers: shader.samplers,
                constant_buffers: shader.constant_blocks,
            };
            (shader.stage, state)
        })
        .collect();

    Ok(PipelineState {
        event_id,
        api,
        shaders,
        viewports: bindings.viewports,
        render_targets: bindings
            .render_targets
            .iter()
            .map(|bound| target(bound.index, bound.resource_id))
            .collect(),
        depth_target: bindings.depth_target.map(|id| target(0, id)),
        input_assembly: InputAssembly {
            topology: bindings.topology,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::snapshot::test_support::fixture_provider;

    #[test]
    fn reports_stages_targets_and_topology() {
        let mut provider = fixture_provider();
        let state = pipeline_state(&mut provider, 21).expect("pipeline");
        assert_eq!(state.api, "Vulkan");
        assert_eq!(
            state.shaders.keys().copied().collect::<Vec<_>>(),
            [ShaderStage::Vertex, ShaderStage::Pixel]
        );
        assert_eq!(state.render_targets.len(), 1);
        assert_eq!(state.render_targets[0].name, "GBuffer Albedo");
        assert_eq!(
            state.depth_target.as_ref().map(|depth| depth.name.as_str()),
            Some("Shadow Map")
        );
        assert_eq!(state.input_assembly.topology, "TriangleList");
    }

    #[test]
    fn serialises_stage_names_and_texture_details() {
        let mut provider = fixture_provider();
        let value =
            serde_json::to_value(pipeline_state(&mut provider, 21).expect("pipeline")).expect("json");
        let shadow_map = &value["shaders"]["pixel"]["resources"][0];
        assert_eq!(shadow_map["name"], "shadowMap");
        assert_eq!(shadow_map["type"], "Texture2D");
        assert_eq!(shadow_map["format"], "D32_FLOAT");
        assert_eq!(value["shaders"]["pixel"]["samplers"][0]["compare_function"], "LessEqual");
        assert_eq!(value["viewports"][0]["max_depth"], 1.0);
    }

    #[test]
    fn compute_events_have_no_targets() {
        let mut provider = fixture_provider();
        let value =
            serde_json::to_value(pipeline_state(&mut provider, 22).expect("pipeline")).expect("json");
        assert_eq!(value["shaders"]["compute"]["uavs"][0]["name"], "lightList");
        assert!(value["shaders"]["compute"]["uavs"][0].get("format").is_none());
        assert!(value.get("depth_target").is_none());
    }

    #[test]
    fn unknown_events_fail() {
        let mut provider = fixture_provider();
        let error = pipeline_state(&mut provider, 12).expect_err("no event 12");
        assert_eq!(error.to_string(), "Event ID 12 not found");
    }
}
