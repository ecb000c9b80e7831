//! Server lifecycle: one replay queue and one listener, started and stopped
//! explicitly.

use std::net::SocketAddr;
use std::sync::Arc;

use capbridge_config::Config;
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::DispatchConnectionHandler;
use crate::provider::{CaptureProvider, ProviderError, ReplayQueue};
use crate::transport::{ListenerError, ListenerHandle, ListenerOptions, SocketListener};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors surfaced while starting or stopping the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The replay worker could not be started.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The listener failed to bind or stop.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// `start` was called on a running server.
    #[error("server is already running on {addr}")]
    AlreadyRunning {
        /// Address the running listener is bound to.
        addr: SocketAddr,
    },
}

#[derive(Debug)]
struct Running {
    addr: SocketAddr,
    listener: ListenerHandle,
}

/// Owns the capture provider's replay queue and the connection listener.
///
/// The provider is moved onto its replay worker when the server is built and
/// stays there across restarts; `start` and `stop` only govern the listener.
#[derive(Debug)]
pub struct Server {
    host: String,
    port: u16,
    options: ListenerOptions,
    queue: ReplayQueue,
    running: Option<Running>,
}

impl Server {
    /// Builds a stopped server around `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Provider`] when the replay worker cannot be
    /// spawned.
    pub fn new<P: CaptureProvider>(config: &Config, provider: P) -> Result<Self, ServerError> {
        Ok(Self {
            host: config.host().to_owned(),
            port: config.port(),
            options: ListenerOptions {
                accept_poll: config.accept_poll(),
                read_timeout: config.read_timeout(),
            },
            queue: ReplayQueue::spawn(provider)?,
            running: None,
        })
    }

    /// Binds the configured endpoint and starts accepting connections.
    ///
    /// Returns the bound address, which carries the real port when the
    /// configuration asked for port 0.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] when the server is running and
    /// [`ServerError::Listener`] when binding fails.
    pub fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if let Some(running) = &self.running {
            return Err(ServerError::AlreadyRunning { addr: running.addr });
        }
        let listener = SocketListener::bind(&self.host, self.port, self.options)?;
        let addr = listener.local_addr();
        let handler = Arc::new(DispatchConnectionHandler::new(self.queue.clone()));
        let handle = listener.start(handler)?;
        info!(target: SERVER_TARGET, %addr, "server started");
        self.running = Some(Running {
            addr,
            listener: handle,
        });
        Ok(addr)
    }

    /// Stops accepting connections and waits for the workers to drain.
    /// Stopping a stopped server does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listener`] when the accept thread panicked.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        let Some(Running { addr, listener }) = self.running.take() else {
            return Ok(());
        };
        listener.shutdown();
        listener.join()?;
        info!(target: SERVER_TARGET, %addr, "server stopped");
        Ok(())
    }

    /// Returns true while the listener is accepting connections.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Address of the running listener.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.addr)
    }

    /// Queue through which all provider access is serialised.
    #[must_use]
    pub const fn queue(&self) -> &ReplayQueue {
        &self.queue
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(target: SERVER_TARGET, %error, "server did not stop cleanly");
        }
    }
}
