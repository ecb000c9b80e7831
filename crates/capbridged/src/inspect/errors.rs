//! Errors raised while inspecting resources and shaders.

use thiserror::Error;

use crate::provider::ProviderError;

/// Failures of an inspection request.
#[derive(Debug, Error)]
pub enum InspectError {
    /// A request argument is outside the range the resource allows.
    #[error("{message}")]
    InvalidArgument {
        /// Description of the offending argument.
        message: String,
    },
    /// The provider could not answer.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl InspectError {
    /// Creates an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
