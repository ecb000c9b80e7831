//! Wire types shared by the capture bridge daemon and its clients.
//!
//! Both ends of a connection speak the same protocol: every message is a
//! length-prefixed frame (see [`frame`]) carrying one UTF-8 JSON document.
//! Clients send a [`Request`]; the daemon answers each one with exactly one
//! [`Response`] echoing the request id.
//!
//! ```json
//! {"id":"7","method":"get_draw_calls","params":{"marker_filter":"Main"}}
//! {"id":"7","result":{"actions":[],"count":0}}
//! {"id":"8","error":{"code":-32601,"message":"Method not found: nope"}}
//! ```

pub mod frame;
mod message;
mod method;

pub use frame::{
    FrameError, LENGTH_PREFIX_BYTES, encode_frame, read_frame, read_frame_until, write_frame,
};
pub use message::{ErrorCode, ErrorObject, Outcome, Request, Response};
pub use method::Method;

