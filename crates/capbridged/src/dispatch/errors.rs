//! Error types for request dispatch failures.
//!
//! Every failure raised while handling a request maps to one wire error code.
//! None of them terminate the connection; only transport failures do that.

use capbridge_wire::ErrorCode;
use thiserror::Error;

use crate::inspect::InspectError;
use crate::provider::ProviderError;

/// Errors surfaced while parsing and dispatching a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The frame payload is not a JSON request.
    #[error("Parse error: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// The method is not in the catalogue.
    #[error("Method not found: {method}")]
    UnknownMethod {
        /// Method name as sent by the client.
        method: String,
    },

    /// A parameter is missing, has the wrong type or is out of range.
    #[error("{message}")]
    InvalidParams {
        /// Description of the offending parameter.
        message: String,
    },

    /// The provider could not answer.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The result could not be serialised.
    #[error("failed to serialise result: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Internal failure unrelated to the request.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl DispatchError {
    /// Returns the wire error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::UnknownMethod { .. } => ErrorCode::MethodNotFound,
            Self::InvalidParams { .. } => ErrorCode::InvalidParams,
            Self::Provider(_) | Self::Serialize(_) | Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Message carried on the wire: the first line of the display form.
    #[must_use]
    pub fn wire_message(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_owned()
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid parameters error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<InspectError> for DispatchError {
    fn from(error: InspectError) -> Self {
        match error {
            InspectError::InvalidArgument { message } => Self::InvalidParams { message },
            InspectError::Provider(source) => Self::Provider(source),
        }
    }
}
