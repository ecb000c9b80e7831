//! Connection handling abstractions for the daemon listener.

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag raised when the listener is asked to stop.
///
/// Connection workers poll it between frames and return once it is set.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent.
    pub(crate) fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves one connection until the peer disconnects or `shutdown` is
    /// raised. Implementations should avoid panicking; the stream is closed
    /// when it is dropped.
    fn handle(&self, stream: TcpStream, shutdown: &ShutdownFlag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_flag() {
        let flag = ShutdownFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_set());
        flag.request();
        flag.request();
        assert!(observer.is_set());
    }
}
