//! Method routing for request dispatch.
//!
//! The method string is parsed into the closed [`Method`] enum and matched
//! exhaustively. Everything that touches the capture runs as one job on the
//! replay queue; the job serialises its result before returning so that
//! borrowed query results never leave the worker.

use capbridge_wire::{ErrorCode, Method, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use super::errors::DispatchError;
use super::request::{
    BufferParams, DrawCallsParams, EventParams, ListCapturesParams, OpenCaptureParams,
    ResourceParams, ShaderParams, ShaderSearchParams, TextureDataParams, TextureSearchParams,
    TimingsParams, parse_params,
};
use super::response::{CaptureList, CaptureStatus, DrawCallList, OpenedCapture, Pong};
use crate::actions::{
    ActionTimings, ResourceCounts, SearchQuery, action_details, action_timings, filter_actions,
    find_draws, summarise,
};
use crate::inspect::{
    buffer_contents, pipeline_state, shader_info, shader_source, texture_data, texture_info,
};
use crate::provider::{CaptureProvider, ProviderError, ReplayQueue};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

fn to_json<T: Serialize>(value: T) -> Result<Value, DispatchError> {
    Ok(serde_json::to_value(value)?)
}

/// Routes requests to query handlers.
#[derive(Debug, Clone)]
pub(crate) struct Router {
    queue: ReplayQueue,
}

impl Router {
    /// Creates a router that runs provider work on `queue`.
    pub(crate) const fn new(queue: ReplayQueue) -> Self {
        Self { queue }
    }

    /// Handles one request, always producing a response.
    pub(crate) fn dispatch(&self, request: Request) -> Response {
        let Request { id, method, params } = request;
        match self.route(&method, params) {
            Ok(result) => Response::success(id, result),
            Err(failure) => {
                let code = failure.code();
                if code == ErrorCode::Internal {
                    error!(target: DISPATCH_TARGET, method = %method, error = %failure, "request failed");
                } else {
                    debug!(target: DISPATCH_TARGET, method = %method, error = %failure, "request rejected");
                }
                Response::error(id, code, failure.wire_message())
            }
        }
    }

    fn route(&self, name: &str, params: Map<String, Value>) -> Result<Value, DispatchError> {
        let method = Method::parse(name).ok_or_else(|| DispatchError::unknown_method(name))?;
        debug!(target: DISPATCH_TARGET, %method, "dispatching request");

        match method {
            Method::Ping => to_json(Pong::new()),
            Method::GetCaptureStatus => {
                self.run(|provider| to_json(CaptureStatus::from(provider.capture())))
            }
            Method::GetDrawCalls => {
                let filter = parse_params::<DrawCallsParams>(method, params)?.into_filter();
                self.run(move |provider| {
                    let actions = filter_actions(provider.actions()?, &filter);
                    to_json(DrawCallList::from(actions))
                })
            }
            Method::GetFrameSummary => self.run(|provider| {
                let api = provider
                    .capture()
                    .map(|capture| capture.api)
                    .ok_or(ProviderError::NoCaptureLoaded)?;
                let counts = ResourceCounts {
                    textures: provider.textures()?.len(),
                    buffers: provider.buffers()?.len(),
                };
                to_json(summarise(&api, provider.actions()?, counts))
            }),
            Method::FindDrawsByShader => {
                self.search(parse_params::<ShaderSearchParams>(method, params)?.into())
            }
            Method::FindDrawsByTexture => {
                self.search(parse_params::<TextureSearchParams>(method, params)?.into())
            }
            Method::FindDrawsByResource => {
                self.search(parse_params::<ResourceParams>(method, params)?.into())
            }
            Method::GetDrawCallDetails => {
                let EventParams { event_id } = parse_params(method, params)?;
                self.run(move |provider| to_json(action_details(provider.actions()?, event_id)?))
            }
            Method::GetActionTimings => {
                let timings = parse_params::<TimingsParams>(method, params)?;
                self.run(move |provider| {
                    let Some(durations) = provider.gpu_durations()? else {
                        return to_json(ActionTimings::unavailable());
                    };
                    to_json(action_timings(
                        provider.actions()?,
                        &timings.filter(),
                        timings.event_ids.as_deref(),
                        &durations,
                    ))
                })
            }
            Method::GetShaderInfo => {
                let shader = parse_params::<ShaderParams>(method, params)?;
                self.run(move |provider| {
                    to_json(shader_info(provider, shader.event_id, shader.stage)?)
                })
            }
            Method::GetShaderSource => {
                let shader = parse_params::<ShaderParams>(method, params)?;
                self.run(move |provider| {
                    to_json(shader_source(
                        provider,
                        shader.event_id,
                        shader.stage,
                        shader.target.as_deref(),
                    )?)
                })
            }
            Method::GetBufferContents => {
                let buffer = parse_params::<BufferParams>(method, params)?;
                self.run(move |provider| {
                    to_json(buffer_contents(
                        provider,
                        buffer.resource_id,
                        buffer.offset,
                        buffer.length,
                    )?)
                })
            }
            Method::GetTextureInfo => {
                let ResourceParams { resource_id } = parse_params(method, params)?;
                self.run(move |provider| to_json(texture_info(provider, resource_id)?))
            }
            Method::GetTextureData => {
                let texture = parse_params::<TextureDataParams>(method, params)?;
                self.run(move |provider| {
                    to_json(texture_data(
                        provider,
                        texture.resource_id,
                        texture.subresource(),
                        texture.depth_slice,
                    )?)
                })
            }
            Method::GetPipelineState => {
                let EventParams { event_id } = parse_params(method, params)?;
                self.run(move |provider| to_json(pipeline_state(provider, event_id)?))
            }
            Method::ListCaptures => {
                let ListCapturesParams { directory } = parse_params(method, params)?;
                self.run(move |provider| {
                    let captures = provider.list_captures(directory.as_std_path())?;
                    to_json(CaptureList::new(directory.into_string(), captures))
                })
            }
            Method::OpenCapture => {
                let OpenCaptureParams { capture_path } = parse_params(method, params)?;
                self.run(move |provider| {
                    to_json(OpenedCapture::from(
                        provider.open(capture_path.as_std_path())?,
                    ))
                })
            }
        }
    }

    fn search(&self, query: SearchQuery) -> Result<Value, DispatchError> {
        self.run(move |provider| to_json(find_draws(provider, &query)?))
    }

    /// Runs `job` on the replay worker and waits for its serialised result.
    fn run<F>(&self, job: F) -> Result<Value, DispatchError>
    where
        F: FnOnce(&mut dyn CaptureProvider) -> Result<Value, DispatchError> + Send + 'static,
    {
        self.queue.invoke(job)?
    }
}

#[cfg(test)]
mod tests;
