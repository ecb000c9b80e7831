//! Connection handler that serves framed requests.
//!
//! `DispatchConnectionHandler` implements the transport's
//! `ConnectionHandler`. Each connection is served in a loop: read a frame,
//! decode it, route it, write the response frame. Request failures become
//! error responses and the loop continues; only transport failures and
//! shutdown end it.

use std::net::TcpStream;

use capbridge_wire::{FrameError, Response, read_frame_until};
use tracing::{debug, warn};

use super::request::{RejectedRequest, decode_request};
use super::response::ResponseWriter;
use super::router::{DISPATCH_TARGET, Router};
use crate::provider::ReplayQueue;
use crate::transport::{ConnectionHandler, ShutdownFlag};

/// Connection handler that decodes, routes and answers framed requests.
#[derive(Debug, Clone)]
pub struct DispatchConnectionHandler {
    router: Router,
}

impl DispatchConnectionHandler {
    /// Creates a handler whose provider work runs on `queue`.
    #[must_use]
    pub const fn new(queue: ReplayQueue) -> Self {
        Self {
            router: Router::new(queue),
        }
    }

    fn answer(&self, payload: &[u8]) -> Response {
        match decode_request(payload) {
            Ok(request) => self.router.dispatch(request),
            Err(RejectedRequest { id, error }) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                Response::error(id, error.code(), error.wire_message())
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: TcpStream, shutdown: &ShutdownFlag) {
        loop {
            let payload = match read_frame_until(&mut stream, || !shutdown.is_set()) {
                Ok(payload) => payload,
                Err(FrameError::ConnectionClosed) => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    return;
                }
                Err(FrameError::Cancelled) => {
                    debug!(target: DISPATCH_TARGET, "connection closed for shutdown");
                    return;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "failed to read request frame");
                    return;
                }
            };

            let response = self.answer(&payload);
            if let Err(error) = ResponseWriter::new(&mut stream).write_response(&response) {
                warn!(target: DISPATCH_TARGET, %error, "failed to write response");
                return;
            }
        }
    }
}
