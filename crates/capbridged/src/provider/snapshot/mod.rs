//! Capture provider backed by JSON snapshots.
//!
//! A snapshot is a capture that has already been replayed and exported: the
//! action forest, resource descriptions and bytes, per-event bindings and
//! shader disassembly are stored in one JSON document. The provider serves
//! them without a replay engine, which keeps the bridge usable for offline
//! inspection and for tests.

mod document;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

pub use self::document::SnapshotError;
use self::document::Snapshot;
use super::errors::ProviderError;
use super::files::list_capture_files;
use super::types::{
    BufferDesc, CaptureFile, CaptureInfo, EventBindings, ResourceId, ShaderStage, Subresource,
    TextureDesc,
};
use super::{CAPTURE_EXTENSION, CaptureProvider};
use crate::actions::{Action, find_action};

/// Extension of snapshot documents.
pub const SNAPSHOT_EXTENSION: &str = "json";

const SNAPSHOT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::snapshot");

#[derive(Debug)]
struct LoadedCapture {
    filename: String,
    snapshot: Snapshot,
}

/// Serves captures exported as JSON snapshots.
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    loaded: Option<LoadedCapture>,
}

impl SnapshotProvider {
    /// Creates a provider with no capture loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self { loaded: None }
    }

    /// Creates a provider with `document` loaded under `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the document cannot be decoded.
    pub fn from_document(filename: &str, document: &str) -> Result<Self, SnapshotError> {
        let snapshot = Snapshot::parse(document)?;
        Ok(Self {
            loaded: Some(LoadedCapture {
                filename: filename.to_owned(),
                snapshot,
            }),
        })
    }

    fn snapshot(&self) -> Result<&Snapshot, ProviderError> {
        self.loaded
            .as_ref()
            .map(|loaded| &loaded.snapshot)
            .ok_or(ProviderError::NoCaptureLoaded)
    }

    fn event_bindings(&self, event_id: u32) -> Result<EventBindings, ProviderError> {
        let snapshot = self.snapshot()?;
        if find_action(&snapshot.actions, event_id).is_none() {
            return Err(ProviderError::EventNotFound { event_id });
        }
        Ok(snapshot
            .bindings
            .get(&event_id)
            .cloned()
            .unwrap_or_default())
    }

    fn shader_id(&self, event_id: u32, stage: ShaderStage) -> Result<ResourceId, ProviderError> {
        self.event_bindings(event_id)?
            .shader(stage)
            .map(|shader| shader.resource_id)
            .ok_or(ProviderError::ShaderNotBound { stage })
    }
}

impl CaptureProvider for SnapshotProvider {
    fn capture(&self) -> Option<CaptureInfo> {
        self.loaded.as_ref().map(|loaded| CaptureInfo {
            filename: loaded.filename.clone(),
            api: loaded.snapshot.api.clone(),
        })
    }

    fn open(&mut self, path: &Path) -> Result<CaptureInfo, ProviderError> {
        let path_text = path.display().to_string();
        if !path.is_file() {
            return Err(ProviderError::CaptureNotFound { path: path_text });
        }
        let text =
            fs::read_to_string(path).map_err(|source| ProviderError::io(&path_text, source))?;
        let snapshot = Snapshot::parse(&text).map_err(|source| ProviderError::Load {
            path: path_text.clone(),
            source,
        })?;
        let filename = path
            .file_name()
            .map_or_else(|| path_text.clone(), |name| name.to_string_lossy().into_owned());
        info!(
            target: SNAPSHOT_TARGET,
            path = %path_text,
            api = %snapshot.api,
            "capture loaded"
        );
        self.loaded = Some(LoadedCapture { filename, snapshot });
        self.capture().ok_or(ProviderError::NoCaptureLoaded)
    }

    fn list_captures(&self, directory: &Path) -> Result<Vec<CaptureFile>, ProviderError> {
        list_capture_files(directory, &[SNAPSHOT_EXTENSION, CAPTURE_EXTENSION])
    }

    fn actions(&self) -> Result<&[Action], ProviderError> {
        Ok(&self.snapshot()?.actions)
    }

    fn textures(&self) -> Result<Vec<TextureDesc>, ProviderError> {
        Ok(self.snapshot()?.textures.clone())
    }

    fn buffers(&self) -> Result<Vec<BufferDesc>, ProviderError> {
        Ok(self.snapshot()?.buffers.clone())
    }

    fn gpu_durations(&mut self) -> Result<Option<BTreeMap<u32, f64>>, ProviderError> {
        Ok(self.snapshot()?.timings.clone())
    }

    fn bindings(&mut self, event_id: u32) -> Result<EventBindings, ProviderError> {
        self.event_bindings(event_id)
    }

    fn disassembly_targets(
        &mut self,
        event_id: u32,
        stage: ShaderStage,
    ) -> Result<Vec<String>, ProviderError> {
        let shader = self.shader_id(event_id, stage)?;
        Ok(self
            .snapshot()?
            .shaders
            .get(&shader)
            .map(|entries| entries.iter().map(|entry| entry.target.clone()).collect())
            .unwrap_or_default())
    }

    fn disassemble(
        &mut self,
        event_id: u32,
        stage: ShaderStage,
        target: &str,
    ) -> Result<String, ProviderError> {
        let shader = self.shader_id(event_id, stage)?;
        let entry = self
            .snapshot()?
            .shaders
            .get(&shader)
            .and_then(|entries| entries.iter().find(|entry| entry.target == target))
            .ok_or_else(|| ProviderError::disassembly(target, "unknown disassembly target"))?;
        match (&entry.text, &entry.error) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(message)) => Err(ProviderError::disassembly(target, message.as_str())),
            (None, None) => Err(ProviderError::disassembly(target, "no output")),
        }
    }

    fn buffer_data(
        &mut self,
        resource_id: ResourceId,
        offset: u64,
        length: u64,
    ) -> Result<Vec<u8>, ProviderError> {
        let bytes = self
            .snapshot()?
            .buffer_bytes(resource_id)
            .ok_or(ProviderError::ResourceNotFound { resource_id })?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
        let end = usize::try_from(length)
            .ok()
            .and_then(|len| start.checked_add(len))
            .map_or(bytes.len(), |end| end.min(bytes.len()));
        Ok(bytes.get(start..end).map(<[u8]>::to_vec).unwrap_or_default())
    }

    fn texture_data(
        &mut self,
        resource_id: ResourceId,
        subresource: Subresource,
    ) -> Result<Vec<u8>, ProviderError> {
        let snapshot = self.snapshot()?;
        if !snapshot
            .textures
            .iter()
            .any(|texture| texture.resource_id == resource_id)
        {
            return Err(ProviderError::ResourceNotFound { resource_id });
        }
        snapshot
            .texture_bytes(resource_id, subresource)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| ProviderError::subresource_unavailable(resource_id, subresource))
    }
}
