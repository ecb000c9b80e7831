//! Test helpers for the transport module.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ShutdownFlag};

/// Counts connections and closes them immediately.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream, _shutdown: &ShutdownFlag) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Echoes bytes back until the peer closes or shutdown is requested.
#[derive(Debug, Default)]
pub(crate) struct EchoHandler;

impl ConnectionHandler for EchoHandler {
    fn handle(&self, mut stream: TcpStream, shutdown: &ShutdownFlag) {
        let mut buffer = [0_u8; 256];
        while !shutdown.is_set() {
            match stream.read(&mut buffer) {
                Ok(0) => return,
                Ok(read) => {
                    let Some(chunk) = buffer.get(..read) else {
                        return;
                    };
                    if stream.write_all(chunk).is_err() {
                        return;
                    }
                }
                Err(error)
                    if matches!(
                        error.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) => {}
                Err(_) => return,
            }
        }
    }
}
