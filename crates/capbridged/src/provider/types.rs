//! Value types exchanged with a capture provider.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

const RESOURCE_ID_PREFIX: &str = "ResourceId::";

/// Opaque identifier of a GPU resource inside a capture.
///
/// Rendered as `ResourceId::<n>`; parsing also accepts the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RESOURCE_ID_PREFIX}{}", self.0)
    }
}

/// Error returned when text is not a resource id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resource id '{input}'")]
pub struct ParseResourceIdError {
    input: String,
}

impl FromStr for ResourceId {
    type Err = ParseResourceIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix(RESOURCE_ID_PREFIX).unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseResourceIdError {
                input: input.to_owned(),
            })
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResourceIdVisitor;

        impl Visitor<'_> for ResourceIdVisitor {
            type Value = ResourceId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a resource id such as \"ResourceId::42\" or 42")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(ResourceId(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .map(ResourceId)
                    .map_err(|_| E::custom(format!("invalid resource id '{value}'")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ResourceIdVisitor)
    }
}

/// Programmable pipeline stages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Hull (tessellation control) shader.
    Hull,
    /// Domain (tessellation evaluation) shader.
    Domain,
    /// Geometry shader.
    Geometry,
    /// Pixel (fragment) shader.
    Pixel,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// Lower-case stage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl Serialize for ShaderStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShaderStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|_| de::Error::custom(format!("unknown shader stage '{text}'")))
    }
}

/// Identity of the loaded capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureInfo {
    /// File name of the capture.
    pub filename: String,
    /// Graphics API the capture was recorded with.
    pub api: String,
}

/// A capture file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureFile {
    /// File name without directory.
    pub filename: String,
    /// Full path.
    pub path: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Last modification time, RFC 3339 in UTC.
    pub modified_time: String,
}

/// Texture metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDesc {
    /// Texture id.
    pub resource_id: ResourceId,
    /// Debug name, empty when unnamed.
    #[serde(default)]
    pub name: String,
    /// Width of mip 0.
    pub width: u32,
    /// Height of mip 0.
    #[serde(default = "one")]
    pub height: u32,
    /// Depth of mip 0; greater than one only for 3D textures.
    #[serde(default = "one")]
    pub depth: u32,
    /// Number of array slices.
    #[serde(default = "one")]
    pub array_size: u32,
    /// Number of mip levels.
    #[serde(default = "one")]
    pub mip_levels: u32,
    /// Pixel format name.
    pub format: String,
    /// Texture dimensionality, such as `Texture2D` or `Texture3D`.
    pub dimension: String,
    /// Multisample count.
    #[serde(default = "one")]
    pub msaa_samples: u32,
    /// Total size of all subresources.
    #[serde(default)]
    pub byte_size: u64,
}

impl TextureDesc {
    /// Returns true for volume textures.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.dimension.contains("3D")
    }
}

const fn one() -> u32 {
    1
}

/// Buffer metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferDesc {
    /// Buffer id.
    pub resource_id: ResourceId,
    /// Debug name, empty when unnamed.
    #[serde(default)]
    pub name: String,
    /// Size in bytes.
    pub length: u64,
}

/// One subresource of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subresource {
    /// Mip level.
    pub mip: u32,
    /// Array slice.
    pub slice: u32,
    /// MSAA sample.
    pub sample: u32,
}

/// Everything bound to the pipeline at one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventBindings {
    /// Shaders bound at each active stage.
    #[serde(default)]
    pub shaders: Vec<BoundShader>,
    /// Active viewports.
    #[serde(default)]
    pub viewports: Vec<Viewport>,
    /// Colour render targets.
    #[serde(default)]
    pub render_targets: Vec<RenderTargetBinding>,
    /// Depth-stencil target.
    #[serde(default)]
    pub depth_target: Option<ResourceId>,
    /// Primitive topology name.
    #[serde(default)]
    pub topology: String,
}

impl EventBindings {
    /// Shader bound at `stage`, if any.
    #[must_use]
    pub fn shader(&self, stage: ShaderStage) -> Option<&BoundShader> {
        self.shaders.iter().find(|shader| shader.stage == stage)
    }
}

/// A shader bound to one stage, with its reflection and resource bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundShader {
    /// Stage the shader is bound to.
    pub stage: ShaderStage,
    /// Shader id.
    pub resource_id: ResourceId,
    /// Entry point name.
    pub entry_point: String,
    /// Debug name of the shader object.
    #[serde(default)]
    pub name: String,
    /// Encoding of the embedded shader bytes (for example `GLSL` or `SPIRV`).
    #[serde(default)]
    pub encoding: String,
    /// Original source text embedded in the capture, when present.
    #[serde(default)]
    pub embedded_source: Option<String>,
    /// Read-only resources (SRVs, sampled images).
    #[serde(default)]
    pub read_only: Vec<BoundResource>,
    /// Read-write resources (UAVs, storage images).
    #[serde(default)]
    pub read_write: Vec<BoundResource>,
    /// Samplers.
    #[serde(default)]
    pub samplers: Vec<SamplerBinding>,
    /// Constant blocks declared by the shader.
    #[serde(default)]
    pub constant_blocks: Vec<ConstantBlock>,
}

/// A resource bound to a shader slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundResource {
    /// Binding slot.
    pub slot: u32,
    /// Name declared by the shader.
    #[serde(default)]
    pub name: String,
    /// Bound resource.
    pub resource_id: ResourceId,
    /// Declared resource type, such as `Texture2D`.
    #[serde(default)]
    pub resource_type: String,
}

/// A sampler bound to a shader slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerBinding {
    /// Binding slot.
    pub slot: u32,
    /// Name declared by the shader.
    #[serde(default)]
    pub name: String,
    /// Filter mode.
    #[serde(default)]
    pub filter: String,
    /// Addressing mode along U.
    #[serde(default)]
    pub address_u: String,
    /// Addressing mode along V.
    #[serde(default)]
    pub address_v: String,
    /// Addressing mode along W.
    #[serde(default)]
    pub address_w: String,
    /// Maximum anisotropy.
    #[serde(default)]
    pub max_anisotropy: u32,
    /// Minimum level of detail.
    #[serde(default)]
    pub min_lod: f32,
    /// Maximum level of detail.
    #[serde(default)]
    pub max_lod: f32,
    /// Mip level-of-detail bias.
    #[serde(default)]
    pub mip_lod_bias: f32,
    /// Comparison function for shadow samplers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_function: Option<String>,
}

/// A constant block declared by a shader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantBlock {
    /// Binding slot.
    pub slot: u32,
    /// Block name.
    pub name: String,
    /// Size in bytes.
    pub byte_size: u32,
    /// Member variables.
    #[serde(default)]
    pub variables: Vec<ConstantVariable>,
}

/// A member of a constant block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantVariable {
    /// Variable name.
    pub name: String,
    /// Offset inside the block.
    pub byte_offset: u32,
    /// Type name.
    #[serde(default, rename = "type")]
    pub type_name: String,
}

/// A colour output bound at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTargetBinding {
    /// Output index.
    pub index: u32,
    /// Bound resource.
    pub resource_id: ResourceId,
}

/// A viewport rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Near depth.
    #[serde(default)]
    pub min_depth: f32,
    /// Far depth.
    #[serde(default = "unit_depth")]
    pub max_depth: f32,
}

const fn unit_depth() -> f32 {
    1.0
}
