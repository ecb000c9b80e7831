//! Request dispatch for framed daemon connections.
//!
//! Each connection worker reads length-prefixed JSON requests, routes them to
//! the query engine or the capture provider, and writes one response frame
//! per request. The dispatcher integrates with the transport layer via the
//! `ConnectionHandler` trait.
//!
//! ## Protocol
//!
//! ```json
//! {"id":"1","method":"get_draw_calls","params":{"marker_filter":"Main"}}
//! ```
//!
//! is answered with either a result or an error, never both:
//!
//! ```json
//! {"id":"1","result":{"count":1,"actions":[...]}}
//! {"id":"1","error":{"code":-32602,"message":"get_draw_calls: invalid type"}}
//! ```
//!
//! Unknown methods produce `-32601`, bad parameters `-32602`, provider
//! failures `-32000` and undecodable payloads `-32700` with a `null` id.

mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
