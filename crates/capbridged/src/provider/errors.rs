//! Errors reported by capture providers and the replay queue.

use std::io;

use thiserror::Error;

use super::snapshot::SnapshotError;
use super::types::{ResourceId, ShaderStage, Subresource};

/// Failures raised while talking to the capture provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A query needs a loaded capture but none is open.
    #[error("No capture loaded")]
    NoCaptureLoaded,
    /// No action carries the requested event id.
    #[error("Event ID {event_id} not found")]
    EventNotFound {
        /// Requested event id.
        event_id: u32,
    },
    /// The capture has no texture or buffer with this id.
    #[error("Resource {resource_id} not found")]
    ResourceNotFound {
        /// Requested resource.
        resource_id: ResourceId,
    },
    /// No shader is bound at the requested stage.
    #[error("No {stage} shader bound")]
    ShaderNotBound {
        /// Requested stage.
        stage: ShaderStage,
    },
    /// The provider has no bytes for a texture subresource.
    #[error("No data for {resource_id} mip {mip} slice {slice} sample {sample}")]
    SubresourceUnavailable {
        /// Texture id.
        resource_id: ResourceId,
        /// Mip level.
        mip: u32,
        /// Array slice.
        slice: u32,
        /// MSAA sample.
        sample: u32,
    },
    /// Disassembling a shader for one target failed.
    #[error("Disassembly failed for '{target}': {message}")]
    Disassembly {
        /// Disassembly target name.
        target: String,
        /// Provider diagnostic.
        message: String,
    },
    /// The requested capture file does not exist.
    #[error("Capture file not found: {path}")]
    CaptureNotFound {
        /// Requested path.
        path: String,
    },
    /// The directory to list does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// Requested path.
        path: String,
    },
    /// Reading from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A capture file could not be loaded.
    #[error("failed to load capture {path}: {source}")]
    Load {
        /// Path of the capture.
        path: String,
        /// Decoding failure.
        #[source]
        source: SnapshotError,
    },
    /// The replay worker thread could not be started.
    #[error("failed to start replay worker: {source}")]
    WorkerSpawn {
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A job panicked on the replay worker.
    #[error("replay job panicked")]
    WorkerPanicked,
    /// The replay worker is no longer running.
    #[error("replay worker is unavailable")]
    WorkerUnavailable,
}

impl ProviderError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates the error for a missing texture subresource.
    #[must_use]
    pub const fn subresource_unavailable(resource_id: ResourceId, subresource: Subresource) -> Self {
        Self::SubresourceUnavailable {
            resource_id,
            mip: subresource.mip,
            slice: subresource.slice,
            sample: subresource.sample,
        }
    }

    /// Creates a disassembly error.
    pub fn disassembly(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Disassembly {
            target: target.into(),
            message: message.into(),
        }
    }
}
