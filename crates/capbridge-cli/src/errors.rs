//! Error types for the bridge client and the CLI runtime.

use std::io;
use std::sync::Arc;

use capbridge_wire::FrameError;
use thiserror::Error;

/// Failures of a single [`BridgeClient::call`](crate::BridgeClient::call).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon address could not be resolved.
    #[error("failed to resolve daemon address {endpoint}: {source}")]
    Resolve {
        /// `host:port` being resolved.
        endpoint: String,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The daemon refused or did not answer the connection.
    #[error("failed to connect to daemon at {endpoint}: {source}")]
    Connect {
        /// `host:port` being connected to.
        endpoint: String,
        /// Connection failure.
        #[source]
        source: io::Error,
    },
    /// The request could not be serialised.
    #[error("failed to serialise request: {0}")]
    Encode(#[source] serde_json::Error),
    /// Writing the request frame failed.
    #[error("failed to send request to daemon: {0}")]
    Send(#[source] FrameError),
    /// Reading the response frame failed, including timeouts.
    #[error("failed to read response from daemon: {0}")]
    Receive(#[source] FrameError),
    /// The response frame was not a valid response.
    #[error("failed to parse daemon response: {0}")]
    Decode(#[source] serde_json::Error),
    /// The response answered a different request.
    #[error("response id {actual:?} does not match request id {expected}")]
    MismatchedId {
        /// Id sent with the request.
        expected: String,
        /// Id carried by the response.
        actual: Option<String>,
    },
    /// The daemon answered with an error object.
    #[error("[{code}] {message}")]
    Remote {
        /// Wire error code.
        code: i32,
        /// Daemon's one-line message.
        message: String,
    },
}

impl ClientError {
    /// Returns true when the error left the connection unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. }
                | Self::Connect { .. }
                | Self::Send(_)
                | Self::Receive(_)
                | Self::Decode(_)
                | Self::MismatchedId { .. }
        )
    }
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid argument '{argument}': expected key=value")]
    MalformedPair { argument: String },
    #[error("--params must be a JSON object: {reason}")]
    InvalidParamsJson { reason: String },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to serialise result: {0}")]
    SerialiseResult(serde_json::Error),
    #[error("failed to write result: {0}")]
    WriteResult(io::Error),
}
