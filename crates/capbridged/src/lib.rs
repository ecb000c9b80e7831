//! Capture bridge daemon.
//!
//! `capbridged` exposes a loaded GPU frame capture to external tools over a
//! small framed RPC protocol (see [`capbridge_wire`]). A client sends one
//! JSON request per frame; the daemon answers each with exactly one response
//! frame.
//!
//! The crate is layered bottom-up:
//!
//! - [`provider`] defines the [`provider::CaptureProvider`] trait, the
//!   single-worker [`provider::ReplayQueue`] that serialises every access to
//!   it, and a JSON snapshot implementation.
//! - [`actions`] is the query engine over the action forest: the recursive
//!   filter, frame statistics, timings, per-event details and draw search.
//! - [`inspect`] answers shader, pipeline and resource questions.
//! - `dispatch` decodes requests, routes them through the closed method
//!   catalogue and maps failures to wire error codes.
//! - `transport` accepts TCP connections and serves each on its own thread.
//! - [`Server`] ties the queue and the listener together with explicit
//!   `start` and `stop`.

pub mod actions;
mod dispatch;
pub mod inspect;
mod process;
pub mod provider;
mod server;
pub mod telemetry;
mod transport;

pub use dispatch::{DispatchConnectionHandler, DispatchError};
pub use process::{
    AppError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use server::{Server, ServerError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;
