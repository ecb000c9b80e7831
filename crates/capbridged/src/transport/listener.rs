//! Listener implementation for the daemon TCP endpoint.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError, ShutdownFlag};

const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const ACCEPT_THREAD_NAME: &str = "capbridged-accept";

/// Timing knobs for the accept loop and connection workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListenerOptions {
    /// Sleep between accept attempts when no connection is pending.
    pub(crate) accept_poll: Duration,
    /// Receive timeout on accepted streams, bounding how long a worker can
    /// go without observing shutdown.
    pub(crate) read_timeout: Duration,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            accept_poll: Duration::from_millis(25),
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Listener bound to a TCP endpoint but not yet accepting.
#[derive(Debug)]
pub(crate) struct SocketListener {
    addr: SocketAddr,
    listener: TcpListener,
    options: ListenerOptions,
}

impl SocketListener {
    /// Resolves `host:port` and binds the first address it yields.
    pub(crate) fn bind(
        host: &str,
        port: u16,
        options: ListenerOptions,
    ) -> Result<Self, ListenerError> {
        let listener = bind_tcp(host, port)?;
        let addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port,
                source,
            })?;
        Ok(Self {
            addr,
            listener,
            options,
        })
    }

    /// Address actually bound; differs from the request when port 0 was used.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Starts the accept loop on a background thread.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = ShutdownFlag::new();
        let shutdown_flag = shutdown.clone();
        let handle = thread::Builder::new()
            .name(ACCEPT_THREAD_NAME.to_owned())
            .spawn(move || run_accept_loop(self, &shutdown_flag, &handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    shutdown: ShutdownFlag,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop and every connection worker to stop.
    pub(crate) fn shutdown(&self) {
        self.shutdown.request();
    }

    /// Waits for the accept loop, which in turn waits for its workers.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        self.handle.take().map_or(Ok(()), |handle| {
            handle.join().map_err(|_| ListenerError::ThreadPanic)
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.request();
    }
}

fn run_accept_loop(
    listener: SocketListener,
    shutdown: &ShutdownFlag,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.addr,
        "socket listener active"
    );
    let mut workers: Vec<thread::JoinHandle<()>> = Vec::new();
    let mut next_id: u64 = 0;
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.is_set() {
        match accept_connection(&listener) {
            Ok(Some((stream, peer))) => {
                last_error = None;
                next_id = next_id.wrapping_add(1);
                workers.retain(|worker| !worker.is_finished());
                if let Some(worker) = spawn_worker(next_id, peer, stream, shutdown, handler) {
                    workers.push(worker);
                }
            }
            Ok(None) => thread::sleep(listener.options.accept_poll),
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    // Close the socket before waiting on the workers.
    drop(listener);
    for worker in workers {
        if worker.join().is_err() {
            warn!(target: LISTENER_TARGET, "connection worker panicked");
        }
    }
    info!(target: LISTENER_TARGET, "socket listener stopped");
}

fn spawn_worker(
    id: u64,
    peer: SocketAddr,
    stream: TcpStream,
    shutdown: &ShutdownFlag,
    handler: &Arc<dyn ConnectionHandler>,
) -> Option<thread::JoinHandle<()>> {
    let handler = Arc::clone(handler);
    let shutdown = shutdown.clone();
    let spawned = thread::Builder::new()
        .name(format!("capbridged-conn-{id}"))
        .spawn(move || {
            debug!(target: LISTENER_TARGET, %peer, "connection opened");
            handler.handle(stream, &shutdown);
            debug!(target: LISTENER_TARGET, %peer, "connection closed");
        });
    match spawned {
        Ok(worker) => Some(worker),
        Err(error) => {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                %peer,
                "failed to spawn connection worker"
            );
            None
        }
    }
}

fn accept_connection(listener: &SocketListener) -> io::Result<Option<(TcpStream, SocketAddr)>> {
    match listener.listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            stream.set_read_timeout(Some(listener.options.read_timeout))?;
            stream.set_nodelay(true)?;
            Ok(Some((stream, peer)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
