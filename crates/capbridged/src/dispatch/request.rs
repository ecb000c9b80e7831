//! Request decoding and typed method parameters.
//!
//! A frame payload is first parsed as generic JSON so the request id can be
//! echoed even when the envelope is malformed. Parameters are then decoded
//! into one struct per method; serde's diagnostic becomes the `-32602`
//! message.

use camino::Utf8PathBuf;
use capbridge_wire::{Method, Request};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::DispatchError;
use crate::actions::{ActionFilter, ActionFlags, SearchQuery};
use crate::provider::{ResourceId, ShaderStage, Subresource};

/// A payload that could not be decoded into a [`Request`].
#[derive(Debug)]
pub(crate) struct RejectedRequest {
    /// Id recovered from the payload, if any.
    pub(crate) id: Option<String>,
    /// Why decoding failed.
    pub(crate) error: DispatchError,
}

/// Decodes a frame payload into a request.
pub(crate) fn decode_request(payload: &[u8]) -> Result<Request, RejectedRequest> {
    let value: Value = serde_json::from_slice(payload).map_err(|error| RejectedRequest {
        id: None,
        error: DispatchError::parse(error.to_string()),
    })?;
    let id = match value.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => {
            return Err(RejectedRequest {
                id: None,
                error: DispatchError::parse("invalid request: id must be a string"),
            });
        }
    };
    serde_json::from_value(value).map_err(|error| RejectedRequest {
        id,
        error: DispatchError::parse(format!("invalid request: {error}")),
    })
}

/// Decodes `params` into the parameter struct of `method`.
pub(crate) fn parse_params<T: DeserializeOwned>(
    method: Method,
    params: Map<String, Value>,
) -> Result<T, DispatchError> {
    serde_json::from_value(Value::Object(params))
        .map_err(|error| DispatchError::invalid_params(format!("{method}: {error}")))
}

const fn include_children_default() -> bool {
    true
}

/// Parameters of `get_draw_calls`.
#[derive(Debug, Deserialize)]
pub(crate) struct DrawCallsParams {
    #[serde(default = "include_children_default")]
    include_children: bool,
    #[serde(default)]
    marker_filter: Option<String>,
    #[serde(default)]
    exclude_markers: Option<Vec<String>>,
    #[serde(default)]
    event_id_min: Option<i64>,
    #[serde(default)]
    event_id_max: Option<i64>,
    #[serde(default)]
    only_actions: bool,
    #[serde(default)]
    flags_filter: Option<Vec<String>>,
}

impl DrawCallsParams {
    pub(crate) fn into_filter(self) -> ActionFilter {
        ActionFilter {
            include_children: self.include_children,
            marker_filter: self.marker_filter,
            exclude_markers: self.exclude_markers.unwrap_or_default(),
            event_id_min: self.event_id_min,
            event_id_max: self.event_id_max,
            only_actions: self.only_actions,
            flags: self.flags_filter.map(|names| ActionFlags::from_names(&names)),
        }
    }
}

/// Parameters of `get_action_timings`.
#[derive(Debug, Deserialize)]
pub(crate) struct TimingsParams {
    #[serde(default)]
    pub(crate) event_ids: Option<Vec<u32>>,
    #[serde(default)]
    marker_filter: Option<String>,
    #[serde(default)]
    exclude_markers: Option<Vec<String>>,
}

impl TimingsParams {
    pub(crate) fn filter(&self) -> ActionFilter {
        ActionFilter {
            marker_filter: self.marker_filter.clone(),
            exclude_markers: self.exclude_markers.clone().unwrap_or_default(),
            ..ActionFilter::default()
        }
    }
}

/// Parameters of `find_draws_by_shader`.
#[derive(Debug, Deserialize)]
pub(crate) struct ShaderSearchParams {
    shader_name: String,
    #[serde(default)]
    stage: Option<ShaderStage>,
}

impl From<ShaderSearchParams> for SearchQuery {
    fn from(params: ShaderSearchParams) -> Self {
        Self::shader(&params.shader_name, params.stage)
    }
}

/// Parameters of `find_draws_by_texture`.
#[derive(Debug, Deserialize)]
pub(crate) struct TextureSearchParams {
    texture_name: String,
}

impl From<TextureSearchParams> for SearchQuery {
    fn from(params: TextureSearchParams) -> Self {
        Self::texture(&params.texture_name)
    }
}

/// Parameters naming a single resource.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceParams {
    pub(crate) resource_id: ResourceId,
}

impl From<ResourceParams> for SearchQuery {
    fn from(params: ResourceParams) -> Self {
        Self::Resource {
            resource_id: params.resource_id,
        }
    }
}

/// Parameters naming a single event.
#[derive(Debug, Deserialize)]
pub(crate) struct EventParams {
    pub(crate) event_id: u32,
}

/// Parameters of `get_shader_info` and `get_shader_source`.
#[derive(Debug, Deserialize)]
pub(crate) struct ShaderParams {
    pub(crate) event_id: u32,
    pub(crate) stage: ShaderStage,
    #[serde(default)]
    pub(crate) target: Option<String>,
}

/// Parameters of `get_buffer_contents`.
#[derive(Debug, Deserialize)]
pub(crate) struct BufferParams {
    pub(crate) resource_id: ResourceId,
    #[serde(default)]
    pub(crate) offset: u64,
    #[serde(default)]
    pub(crate) length: u64,
}

/// Parameters of `get_texture_data`.
#[derive(Debug, Deserialize)]
pub(crate) struct TextureDataParams {
    pub(crate) resource_id: ResourceId,
    #[serde(default)]
    mip: u32,
    #[serde(default)]
    slice: u32,
    #[serde(default)]
    sample: u32,
    #[serde(default)]
    pub(crate) depth_slice: Option<u32>,
}

impl TextureDataParams {
    pub(crate) const fn subresource(&self) -> Subresource {
        Subresource {
            mip: self.mip,
            slice: self.slice,
            sample: self.sample,
        }
    }
}

/// Parameters of `list_captures`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListCapturesParams {
    pub(crate) directory: Utf8PathBuf,
}

/// Parameters of `open_capture`.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenCaptureParams {
    pub(crate) capture_path: Utf8PathBuf,
}
