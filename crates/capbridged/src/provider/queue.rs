//! Single-worker job queue that owns the capture provider.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, error};

use super::errors::ProviderError;
use super::CaptureProvider;

const WORKER_NAME: &str = "capbridged-replay";
const QUEUE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::replay");

type Job = Box<dyn FnOnce(&mut dyn CaptureProvider) + Send>;

/// Handle used to run closures against the provider on its worker thread.
///
/// Jobs run one at a time in submission order. The worker exits once every
/// handle has been dropped.
#[derive(Clone)]
pub struct ReplayQueue {
    jobs: Sender<Job>,
}

impl std::fmt::Debug for ReplayQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayQueue").finish_non_exhaustive()
    }
}

impl ReplayQueue {
    /// Moves `provider` onto a new worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::WorkerSpawn`] when the thread cannot start.
    pub fn spawn(provider: impl CaptureProvider) -> Result<Self, ProviderError> {
        let (jobs, receiver) = mpsc::channel::<Job>();
        let mut provider: Box<dyn CaptureProvider> = Box::new(provider);
        thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || {
                debug!(target: QUEUE_TARGET, "replay worker started");
                for job in receiver {
                    job(provider.as_mut());
                }
                debug!(target: QUEUE_TARGET, "replay worker stopped");
            })
            .map_err(|source| ProviderError::WorkerSpawn { source })?;
        Ok(Self { jobs })
    }

    /// Runs `job` on the worker and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::WorkerPanicked`] when the job panics and
    /// [`ProviderError::WorkerUnavailable`] when the worker has exited.
    pub fn invoke<R, F>(&self, job: F) -> Result<R, ProviderError>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn CaptureProvider) -> R + Send + 'static,
    {
        let (reply, result) = mpsc::sync_channel(1);
        let wrapped: Job = Box::new(move |provider: &mut dyn CaptureProvider| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(provider)));
            if outcome.is_err() {
                error!(target: QUEUE_TARGET, "replay job panicked");
            }
            reply.send(outcome).ok();
        });
        self.jobs
            .send(wrapped)
            .map_err(|_| ProviderError::WorkerUnavailable)?;
        match result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(ProviderError::WorkerPanicked),
            Err(_) => Err(ProviderError::WorkerUnavailable),
        }
    }
}
