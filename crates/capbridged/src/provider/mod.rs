//! Access to the external capture data provider.
//!
//! The bridge never touches capture files directly. Everything it knows about
//! a frame comes from a [`CaptureProvider`], which owns the loaded capture and
//! is not safe to share between threads. The [`ReplayQueue`] gives the
//! provider a single owning worker thread and lets connection workers submit
//! closures to it.

mod errors;
mod files;
mod queue;
pub mod snapshot;
mod types;

use std::collections::BTreeMap;
use std::path::Path;

pub use self::errors::ProviderError;
pub use self::files::list_capture_files;
pub use self::queue::ReplayQueue;
pub use self::snapshot::{SnapshotError, SnapshotProvider};
pub use self::types::{
    BoundResource, BoundShader, BufferDesc, CaptureFile, CaptureInfo, ConstantBlock,
    ConstantVariable, EventBindings, ParseResourceIdError, RenderTargetBinding, ResourceId,
    SamplerBinding, ShaderStage, Subresource, TextureDesc, Viewport,
};
use crate::actions::Action;

/// Extension of native capture files.
pub const CAPTURE_EXTENSION: &str = "rdc";

/// The replay engine behind the bridge.
///
/// Methods taking `&mut self` may move the replay to another event or decode
/// data; all of them run on the replay worker.
pub trait CaptureProvider: Send + 'static {
    /// Identity of the loaded capture, if any.
    fn capture(&self) -> Option<CaptureInfo>;

    /// Loads the capture at `path`, replacing any loaded capture.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or cannot be decoded; the previously
    /// loaded capture stays loaded in that case.
    fn open(&mut self, path: &Path) -> Result<CaptureInfo, ProviderError>;

    /// Lists capture files in `directory`.
    ///
    /// # Errors
    ///
    /// Fails when the directory does not exist or cannot be read.
    fn list_captures(&self, directory: &Path) -> Result<Vec<CaptureFile>, ProviderError> {
        list_capture_files(directory, &[CAPTURE_EXTENSION])
    }

    /// Root actions of the loaded capture in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoCaptureLoaded`] without a capture.
    fn actions(&self) -> Result<&[Action], ProviderError>;

    /// Textures of the loaded capture.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoCaptureLoaded`] without a capture.
    fn textures(&self) -> Result<Vec<TextureDesc>, ProviderError>;

    /// Buffers of the loaded capture.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoCaptureLoaded`] without a capture.
    fn buffers(&self) -> Result<Vec<BufferDesc>, ProviderError>;

    /// Debug name of a texture or buffer.
    fn resource_name(&self, resource_id: ResourceId) -> Option<String> {
        let texture = self.textures().ok().and_then(|textures| {
            textures
                .into_iter()
                .find(|texture| texture.resource_id == resource_id)
                .map(|texture| texture.name)
        });
        texture.or_else(|| {
            self.buffers().ok().and_then(|buffers| {
                buffers
                    .into_iter()
                    .find(|buffer| buffer.resource_id == resource_id)
                    .map(|buffer| buffer.name)
            })
        })
    }

    /// GPU duration of each action in seconds, keyed by event id.
    ///
    /// `None` means the provider has no duration counters.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NoCaptureLoaded`] without a capture.
    fn gpu_durations(&mut self) -> Result<Option<BTreeMap<u32, f64>>, ProviderError>;

    /// Pipeline bindings at `event_id`.
    ///
    /// # Errors
    ///
    /// Fails when no capture is loaded or the event does not exist.
    fn bindings(&mut self, event_id: u32) -> Result<EventBindings, ProviderError>;

    /// Disassembly targets offered for the shader bound at `stage`.
    ///
    /// # Errors
    ///
    /// Fails when the event does not exist or no shader is bound at `stage`.
    fn disassembly_targets(
        &mut self,
        event_id: u32,
        stage: ShaderStage,
    ) -> Result<Vec<String>, ProviderError>;

    /// Disassembles the shader bound at `stage` for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Disassembly`] when the target cannot produce
    /// output.
    fn disassemble(
        &mut self,
        event_id: u32,
        stage: ShaderStage,
        target: &str,
    ) -> Result<String, ProviderError>;

    /// Reads `length` bytes of a buffer starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails when the buffer does not exist.
    fn buffer_data(
        &mut self,
        resource_id: ResourceId,
        offset: u64,
        length: u64,
    ) -> Result<Vec<u8>, ProviderError>;

    /// Reads one texture subresource.
    ///
    /// # Errors
    ///
    /// Fails when the texture or subresource does not exist.
    fn texture_data(
        &mut self,
        resource_id: ResourceId,
        subresource: Subresource,
    ) -> Result<Vec<u8>, ProviderError>;
}
