//! Fake daemon for client and CLI tests.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use capbridge_wire::{Request, Response, read_frame, write_frame};

/// Answers each request with the handler's response, or drops the
/// connection when the handler returns `None`.
pub(crate) struct FakeDaemon {
    port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeDaemon {
    pub(crate) fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Option<Response> + Send + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind fake daemon");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let recorded = Arc::clone(&requests);
        let accepted = Arc::clone(&connections);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { return };
                accepted.fetch_add(1, Ordering::SeqCst);
                while let Ok(payload) = read_frame(&mut stream) {
                    let request = Request::decode(&payload).expect("request json");
                    let reply = handler(&request);
                    recorded.lock().expect("requests lock").push(request);
                    let Some(response) = reply else { break };
                    let encoded = response.encode().expect("encode response");
                    if write_frame(&mut stream, &encoded).is_err() {
                        break;
                    }
                }
            }
        });
        Self {
            port,
            requests,
            connections,
        }
    }

    /// Echoes `{"method": ..., "params": ...}` back as the result.
    pub(crate) fn echo() -> Self {
        Self::spawn(|request| {
            Some(Response::success(
                request.id.clone(),
                serde_json::json!({"method": request.method, "params": request.params}),
            ))
        })
    }

    pub(crate) const fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}
