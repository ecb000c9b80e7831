//! Inspection of shaders, pipeline state and resource contents.

mod errors;
mod pipeline;
mod resources;
mod shader;

pub use self::errors::InspectError;
pub use self::pipeline::{
    InputAssembly, PipelineState, ResourceState, StageState, TargetState, TextureDetails,
    pipeline_state,
};
pub use self::resources::{
    BufferContents, TextureData, buffer_contents, texture_data, texture_info,
};
pub use self::shader::{
    ReflectedResource, ResourceAccess, ShaderInfo, ShaderSource, pick_disassembly_target,
    shader_info, shader_source,
};
