//! Blocking client for the bridge daemon.
//!
//! The client connects lazily on the first call and keeps the connection
//! open between calls. Any transport failure discards the connection; the
//! next call reconnects. A failed call is never retried automatically.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use capbridge_wire::{Outcome, Request, Response, read_frame_until, write_frame};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ClientError;

/// Time allowed for establishing a connection.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for a call's response, including replay work on the
/// daemon side.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Client holding at most one connection to the daemon.
#[derive(Debug)]
pub struct BridgeClient {
    host: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl BridgeClient {
    /// Creates a client for `host:port`. No connection is made yet.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_CALL_TIMEOUT,
            stream: None,
        }
    }

    /// Replaces the per-call response timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true while a connection is held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drops the held connection, if any.
    pub fn close(&mut self) {
        self.stream = None;
    }

    /// Sends `method` with `params` and returns the result value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] when the daemon answers with an error
    /// object; the connection stays open in that case. Every other error
    /// drops the connection.
    pub fn call(&mut self, method: &str, params: Map<String, Value>) -> Result<Value, ClientError> {
        let request = Request::new(Uuid::new_v4().to_string(), method, params);
        let result = self.exchange(&request);
        if result.as_ref().is_err_and(ClientError::is_transport) {
            self.close();
        }
        result
    }

    fn exchange(&mut self, request: &Request) -> Result<Value, ClientError> {
        let payload = request.encode().map_err(ClientError::Encode)?;
        let stream = self.connection()?;
        write_frame(stream, &payload).map_err(ClientError::Send)?;
        // The socket's read timeout is the call timeout: give up on the first.
        let reply = read_frame_until(stream, || false).map_err(ClientError::Receive)?;
        let response = Response::decode(&reply).map_err(ClientError::Decode)?;
        if response.id != request.id {
            return Err(ClientError::MismatchedId {
                expected: request.id.clone().unwrap_or_default(),
                actual: response.id,
            });
        }
        match response.outcome {
            Outcome::Result(value) => Ok(value),
            Outcome::Error(error) => Err(ClientError::Remote {
                code: error.code,
                message: error.message,
            }),
        }
    }

    fn connection(&mut self) -> Result<&mut TcpStream, ClientError> {
        let stream = self.stream.take().map_or_else(|| self.connect(), Ok)?;
        Ok(self.stream.insert(stream))
    }

    fn connect(&self) -> Result<TcpStream, ClientError> {
        let endpoint = self.endpoint();
        let address = resolve(&self.host, self.port).map_err(|source| ClientError::Resolve {
            endpoint: endpoint.clone(),
            source,
        })?;
        let stream = TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
            .and_then(|stream| {
                stream.set_read_timeout(Some(self.timeout))?;
                stream.set_write_timeout(Some(self.timeout))?;
                stream.set_nodelay(true)?;
                Ok(stream)
            })
            .map_err(|source| ClientError::Connect { endpoint, source })?;
        Ok(stream)
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn resolve(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "no resolved addresses",
        )
    })
}
