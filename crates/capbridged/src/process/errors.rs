//! Errors that end the daemon process.

use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use thiserror::Error;

use crate::provider::ProviderError;
use crate::server::ServerError;
use crate::telemetry::TelemetryError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or running the daemon.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The capture named by `capture_path` could not be opened.
    #[error("failed to open start-up capture '{path}': {source}")]
    Capture {
        /// Configured capture path.
        path: Utf8PathBuf,
        /// Provider failure.
        #[source]
        source: ProviderError,
    },
    /// The server failed to start or stop.
    #[error(transparent)]
    Server(#[from] ServerError),
    /// Waiting for a shutdown signal failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl From<Arc<OrthoError>> for AppError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Config { source }
    }
}
