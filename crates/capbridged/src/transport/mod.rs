//! TCP listener and per-connection workers.
//!
//! The transport binds the configured endpoint, accepts connections in a
//! background thread and hands each accepted stream to a
//! [`ConnectionHandler`] on its own named thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ShutdownFlag};
pub(crate) use self::listener::{ListenerHandle, ListenerOptions, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, EchoHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
