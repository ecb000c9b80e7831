//! The closed catalogue of methods understood by the daemon.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every method a client may call.
///
/// Method names are matched exactly (they are case-sensitive on the wire).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Method {
    /// Liveness probe.
    Ping,
    /// Reports whether a capture is loaded.
    GetCaptureStatus,
    /// Filtered action tree.
    GetDrawCalls,
    /// Per-kind action counts and top-level markers.
    GetFrameSummary,
    /// Reverse lookup by shader name or entry point.
    FindDrawsByShader,
    /// Reverse lookup by texture name.
    FindDrawsByTexture,
    /// Reverse lookup by resource id.
    FindDrawsByResource,
    /// Full record of a single action.
    GetDrawCallDetails,
    /// GPU durations for leaf actions.
    GetActionTimings,
    /// Shader reflection and disassembly at an event.
    GetShaderInfo,
    /// Most readable source text for a bound shader.
    GetShaderSource,
    /// Raw buffer bytes.
    GetBufferContents,
    /// Texture metadata.
    GetTextureInfo,
    /// Texture bytes for one subresource.
    GetTextureData,
    /// Full pipeline state at an event.
    GetPipelineState,
    /// Capture files in a directory.
    ListCaptures,
    /// Loads a capture, replacing the current one.
    OpenCapture,
}

impl Method {
    /// Parses a wire method name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Wire name of the method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
