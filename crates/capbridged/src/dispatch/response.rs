//! Response framing and result envelopes.
//!
//! [`ResponseWriter`] encodes a [`Response`] and writes it as one frame. The
//! remaining types are the result bodies of methods that do not return a
//! query result directly.

use std::io::Write;

use capbridge_wire::{FrameError, Response, write_frame};
use serde::Serialize;
use thiserror::Error;

use crate::actions::ActionNode;
use crate::provider::{CaptureFile, CaptureInfo};

/// Writer that frames responses onto a stream.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub(crate) const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response frame and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub(crate) fn write_response(&mut self, response: &Response) -> Result<(), ResponseWriteError> {
        let payload = response.encode()?;
        write_frame(&mut self.writer, &payload)?;
        self.writer.flush().map_err(FrameError::Io)?;
        Ok(())
    }
}

/// Failure to deliver a response.
#[derive(Debug, Error)]
pub(crate) enum ResponseWriteError {
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result of `ping`.
#[derive(Debug, Serialize)]
pub(crate) struct Pong {
    status: &'static str,
    message: &'static str,
}

impl Pong {
    pub(crate) const fn new() -> Self {
        Self {
            status: "ok",
            message: "pong",
        }
    }
}

/// Result of `get_capture_status`.
#[derive(Debug, Serialize)]
pub(crate) struct CaptureStatus {
    loaded: bool,
    #[serde(flatten)]
    capture: Option<CaptureInfo>,
}

impl From<Option<CaptureInfo>> for CaptureStatus {
    fn from(capture: Option<CaptureInfo>) -> Self {
        Self {
            loaded: capture.is_some(),
            capture,
        }
    }
}

/// Result of `get_draw_calls`.
#[derive(Debug, Serialize)]
pub(crate) struct DrawCallList<'a> {
    count: usize,
    actions: Vec<ActionNode<'a>>,
}

impl<'a> From<Vec<ActionNode<'a>>> for DrawCallList<'a> {
    fn from(actions: Vec<ActionNode<'a>>) -> Self {
        Self {
            count: actions.len(),
            actions,
        }
    }
}

/// Result of `list_captures`.
#[derive(Debug, Serialize)]
pub(crate) struct CaptureList {
    directory: String,
    count: usize,
    captures: Vec<CaptureFile>,
}

impl CaptureList {
    pub(crate) fn new(directory: String, captures: Vec<CaptureFile>) -> Self {
        Self {
            directory,
            count: captures.len(),
            captures,
        }
    }
}

/// Result of `open_capture`.
#[derive(Debug, Serialize)]
pub(crate) struct OpenedCapture {
    success: bool,
    #[serde(flatten)]
    capture: CaptureInfo,
}

impl From<CaptureInfo> for OpenedCapture {
    fn from(capture: CaptureInfo) -> Self {
        Self {
            success: true,
            capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use capbridge_wire::{ErrorCode, read_frame};
    use serde_json::json;

    use super::*;

    #[test]
    fn writes_one_frame_per_response() {
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        writer
            .write_response(&Response::success(Some("1".to_owned()), json!(true)))
            .expect("write response");

        let payload = read_frame(&mut output.as_slice()).expect("frame");
        let decoded = Response::decode(&payload).expect("decode");
        assert_eq!(decoded.into_result().expect("success"), json!(true));
    }

    #[test]
    fn error_responses_carry_code_and_message() {
        let mut output = Vec::new();
        ResponseWriter::new(&mut output)
            .write_response(&Response::error(None, ErrorCode::MethodNotFound, "nope"))
            .expect("write response");
        let payload = read_frame(&mut output.as_slice()).expect("frame");
        let value: serde_json::Value = serde_json::from_slice(&payload).expect("json");
        assert_eq!(
            value,
            json!({"id": null, "error": {"code": -32601, "message": "nope"}})
        );
    }

    #[test]
    fn capture_status_flattens_the_capture() {
        let unloaded = serde_json::to_value(CaptureStatus::from(None)).expect("json");
        assert_eq!(unloaded, json!({"loaded": false}));

        let loaded = serde_json::to_value(CaptureStatus::from(Some(CaptureInfo {
            filename: "frame.rdc".to_owned(),
            api: "D3D12".to_owned(),
        })))
        .expect("json");
        assert_eq!(
            loaded,
            json!({"loaded": true, "filename": "frame.rdc", "api": "D3D12"})
        );
    }
}
