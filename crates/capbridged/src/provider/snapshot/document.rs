//! On-disk layout of a capture snapshot and its decoded form.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

use crate::actions::Action;
use crate::provider::types::{BufferDesc, EventBindings, ResourceId, Subresource, TextureDesc};

/// Errors raised while decoding a snapshot document.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not valid JSON or does not match the layout.
    #[error("invalid snapshot document: {source}")]
    Json {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A resource carries data that is not valid base64.
    #[error("invalid base64 data for {resource_id}: {source}")]
    Base64 {
        /// Resource whose data failed to decode.
        resource_id: ResourceId,
        /// Decoder error.
        #[source]
        source: base64::DecodeError,
    },
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    api: String,
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default)]
    textures: Vec<RawTexture>,
    #[serde(default)]
    buffers: Vec<RawBuffer>,
    #[serde(default)]
    timings: Option<BTreeMap<u32, f64>>,
    #[serde(default)]
    bindings: BTreeMap<u32, EventBindings>,
    #[serde(default)]
    shaders: BTreeMap<ResourceId, Vec<RawDisassembly>>,
}

#[derive(Debug, Deserialize)]
struct RawTexture {
    #[serde(flatten)]
    desc: TextureDesc,
    #[serde(default)]
    subresources: Vec<RawSubresource>,
}

#[derive(Debug, Deserialize)]
struct RawSubresource {
    #[serde(default)]
    mip: u32,
    #[serde(default)]
    slice: u32,
    #[serde(default)]
    sample: u32,
    data: String,
}

#[derive(Debug, Deserialize)]
struct RawBuffer {
    resource_id: ResourceId,
    #[serde(default)]
    name: String,
    data: String,
}

/// Output of one disassembly target, or the reason it has none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct RawDisassembly {
    pub(crate) target: String,
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

type SubresourceKey = (ResourceId, u32, u32, u32);

/// A fully decoded snapshot.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub(crate) api: String,
    pub(crate) actions: Vec<Action>,
    pub(crate) textures: Vec<TextureDesc>,
    pub(crate) buffers: Vec<BufferDesc>,
    pub(crate) timings: Option<BTreeMap<u32, f64>>,
    pub(crate) bindings: BTreeMap<u32, EventBindings>,
    pub(crate) shaders: BTreeMap<ResourceId, Vec<RawDisassembly>>,
    buffer_bytes: BTreeMap<ResourceId, Vec<u8>>,
    texture_bytes: BTreeMap<SubresourceKey, Vec<u8>>,
}

impl Snapshot {
    /// Parses and decodes a snapshot document.
    pub(crate) fn parse(text: &str) -> Result<Self, SnapshotError> {
        let raw: RawDocument =
            serde_json::from_str(text).map_err(|source| SnapshotError::Json { source })?;

        let mut textures = Vec::with_capacity(raw.textures.len());
        let mut texture_bytes = BTreeMap::new();
        for texture in raw.textures {
            let resource_id = texture.desc.resource_id;
            for subresource in texture.subresources {
                let bytes = decode(resource_id, &subresource.data)?;
                texture_bytes.insert(
                    (resource_id, subresource.mip, subresource.slice, subresource.sample),
                    bytes,
                );
            }
            textures.push(texture.desc);
        }

        let mut buffers = Vec::with_capacity(raw.buffers.len());
        let mut buffer_bytes = BTreeMap::new();
        for buffer in raw.buffers {
            let bytes = decode(buffer.resource_id, &buffer.data)?;
            buffers.push(BufferDesc {
                resource_id: buffer.resource_id,
                name: buffer.name,
                length: bytes.len() as u64,
            });
            buffer_bytes.insert(buffer.resource_id, bytes);
        }

        Ok(Self {
            api: raw.api,
            actions: raw.actions,
            textures,
            buffers,
            timings: raw.timings,
            bindings: raw.bindings,
            shaders: raw.shaders,
            buffer_bytes,
            texture_bytes,
        })
    }

    pub(crate) fn buffer_bytes(&self, resource_id: ResourceId) -> Option<&[u8]> {
        self.buffer_bytes.get(&resource_id).map(Vec::as_slice)
    }

    pub(crate) fn texture_bytes(
        &self,
        resource_id: ResourceId,
        subresource: Subresource,
    ) -> Option<&[u8]> {
        self.texture_bytes
            .get(&(
                resource_id,
                subresource.mip,
                subresource.slice,
                subresource.sample,
            ))
            .map(Vec::as_slice)
    }
}

fn decode(resource_id: ResourceId, data: &str) -> Result<Vec<u8>, SnapshotError> {
    STANDARD
        .decode(data)
        .map_err(|source| SnapshotError::Base64 {
            resource_id,
            source,
        })
}
