//! Daemon launch sequencing.

use capbridge_config::Config;
use ortho_config::OrthoConfig;
use tracing::info;

use crate::provider::{CaptureProvider, SnapshotProvider};
use crate::server::Server;
use crate::telemetry;

use super::PROCESS_TARGET;
use super::errors::AppError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the daemon with the production collaborators: configuration from
/// files, environment and arguments, a snapshot provider and POSIX signals.
///
/// # Errors
///
/// Returns [`AppError`] when any launch step fails.
pub fn run_daemon() -> Result<(), AppError> {
    let config = Config::load()?;
    telemetry::initialise(&config)?;
    run_daemon_with(&config, &SystemShutdownSignal)
}

/// Runs the daemon with an injected shutdown signal. Telemetry is left to
/// the caller.
///
/// # Errors
///
/// Returns [`AppError::Capture`] when the configured start-up capture cannot
/// be opened, and [`AppError::Server`] or [`AppError::Shutdown`] for listener
/// and signal failures.
pub fn run_daemon_with<S: ShutdownSignal>(config: &Config, shutdown: &S) -> Result<(), AppError> {
    info!(
        target: PROCESS_TARGET,
        endpoint = %config.endpoint(),
        "starting daemon runtime"
    );
    let mut provider = SnapshotProvider::new();
    if let Some(path) = config.capture_path() {
        provider
            .open(path.as_std_path())
            .map_err(|source| AppError::Capture {
                path: path.to_path_buf(),
                source,
            })?;
    }

    let mut server = Server::new(config, provider)?;
    server.start()?;
    shutdown.wait()?;
    server.stop()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
