//! Length-prefixed framing.
//!
//! A frame is a 4-byte big-endian unsigned length followed by exactly that
//! many payload bytes. The codec does not look inside the payload and does not
//! cap its size; a capacity limit is a deployment decision for the layers
//! above.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Number of bytes in the length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest step by which a payload buffer grows ahead of received bytes.
const PAYLOAD_STEP_BYTES: usize = 64 * 1024;

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer closed the stream before a complete frame arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,
    /// The payload cannot be described by a 32-bit length prefix.
    #[error("payload of {len} bytes does not fit in a frame")]
    PayloadTooLarge {
        /// Size of the rejected payload.
        len: u64,
    },
    /// A timed-out read was abandoned because the caller stopped waiting.
    #[error("frame read abandoned after receive timeout")]
    Cancelled,
    /// Any other socket failure.
    #[error("frame I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Returns true when the error means the peer has gone away.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

/// Encodes `payload` into a single frame buffer.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] when the payload length exceeds
/// `u32::MAX`.
#[expect(
    clippy::big_endian_bytes,
    reason = "the wire format mandates a big-endian length prefix"
)]
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        len: payload.len() as u64,
    })?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Writes `payload` as one frame and flushes the writer.
///
/// The prefix and payload are handed to the writer as a single buffer;
/// `write_all` retries partial writes.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] for oversized payloads (nothing is
/// written in that case) or [`FrameError::Io`] when the socket write fails.
pub fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: Write + ?Sized,
{
    let frame = encode_frame(payload)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Reads one complete frame, blocking until it arrives.
///
/// # Errors
///
/// Returns [`FrameError::ConnectionClosed`] when the stream ends before the
/// prefix or payload is complete, and [`FrameError::Io`] for other failures.
pub fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FrameError>
where
    R: Read + ?Sized,
{
    read_frame_until(reader, || true)
}

/// Reads one complete frame, consulting `keep_waiting` whenever the
/// underlying read times out.
///
/// Bytes received before a timeout are kept, so a slow peer never corrupts
/// framing. When `keep_waiting` returns `false` the read is abandoned with
/// [`FrameError::Cancelled`].
///
/// # Errors
///
/// As [`read_frame`], plus [`FrameError::Cancelled`].
#[expect(
    clippy::big_endian_bytes,
    reason = "the wire format mandates a big-endian length prefix"
)]
pub fn read_frame_until<R, F>(reader: &mut R, mut keep_waiting: F) -> Result<Vec<u8>, FrameError>
where
    R: Read + ?Sized,
    F: FnMut() -> bool,
{
    let mut prefix = [0_u8; LENGTH_PREFIX_BYTES];
    fill_exact(reader, &mut prefix, &mut keep_waiting)?;
    let declared = u32::from_be_bytes(prefix);
    let len = usize::try_from(declared).map_err(|_| FrameError::PayloadTooLarge {
        len: u64::from(declared),
    })?;
    read_payload(reader, len, &mut keep_waiting)
}

/// Reads `len` payload bytes, growing the buffer only as data arrives so a
/// bogus prefix cannot force a large allocation up front.
fn read_payload<R, F>(
    reader: &mut R,
    len: usize,
    keep_waiting: &mut F,
) -> Result<Vec<u8>, FrameError>
where
    R: Read + ?Sized,
    F: FnMut() -> bool,
{
    let mut payload = Vec::with_capacity(len.min(PAYLOAD_STEP_BYTES));
    while payload.len() < len {
        let start = payload.len();
        let step = len.saturating_sub(start).min(PAYLOAD_STEP_BYTES);
        payload.resize(start.saturating_add(step), 0);
        if let Some(window) = payload.get_mut(start..) {
            fill_exact(reader, window, keep_waiting)?;
        }
    }
    Ok(payload)
}

fn fill_exact<R, F>(reader: &mut R, buf: &mut [u8], keep_waiting: &mut F) -> Result<(), FrameError>
where
    R: Read + ?Sized,
    F: FnMut() -> bool,
{
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(read) => filled += read,
            Err(error) => match error.kind() {
                io::ErrorKind::Interrupted => {}
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                    if !keep_waiting() {
                        return Err(FrameError::Cancelled);
                    }
                }
                io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => return Err(FrameError::ConnectionClosed),
                _ => return Err(FrameError::Io(error)),
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    /// Reader that replays a scripted sequence of chunks and errors.
    struct ScriptedReader {
        steps: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedReader {
        fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(error)) => Err(error),
                Some(Ok(chunk)) => {
                    let len = chunk.len().min(buf.len());
                    buf[..len].copy_from_slice(&chunk[..len]);
                    if len < chunk.len() {
                        self.steps.push_front(Ok(chunk[len..].to_vec()));
                    }
                    Ok(len)
                }
            }
        }
    }

    fn timeout() -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"))
    }

    #[rstest]
    #[case::empty(0)]
    #[case::one_byte(1)]
    #[case::prefix_sized(4)]
    #[case::large(70_000)]
    fn frames_round_trip(#[case] len: usize) {
        let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let mut wire = Vec::new();
        write_frame(&mut wire, &payload).expect("write frame");
        assert_eq!(wire.len(), LENGTH_PREFIX_BYTES + len);

        let mut cursor = Cursor::new(wire);
        let decoded = read_frame(&mut cursor).expect("read frame");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn oversized_prefixes_fail_on_close_without_reserving_the_length() {
        let mut bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        bytes.extend_from_slice(b"short");
        let mut reader = ScriptedReader::new(vec![Ok(bytes)]);
        assert!(matches!(
            read_frame(&mut reader),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn payloads_spanning_several_steps_survive_timeouts() {
        let payload: Vec<u8> = (0..PAYLOAD_STEP_BYTES * 2 + 17)
            .map(|i| (i % 13) as u8)
            .collect();
        let frame = encode_frame(&payload).expect("encode");
        let (head, tail) = frame.split_at(PAYLOAD_STEP_BYTES + 100);
        let mut reader =
            ScriptedReader::new(vec![Ok(head.to_vec()), timeout(), Ok(tail.to_vec())]);
        let decoded = read_frame_until(&mut reader, || true).expect("frame");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn prefix_is_big_endian() {
        let frame = encode_frame(&[0xAA; 258]).expect("encode");
        assert_eq!(&frame[..4], &[0, 0, 1, 2]);
    }

    #[test]
    fn consecutive_frames_are_read_in_order() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"first").expect("first");
        write_frame(&mut wire, b"").expect("empty");
        write_frame(&mut wire, b"third").expect("third");

        let mut cursor = Cursor::new(wire);
        assert_eq!(read_frame(&mut cursor).expect("1"), b"first");
        assert_eq!(read_frame(&mut cursor).expect("2"), b"");
        assert_eq!(read_frame(&mut cursor).expect("3"), b"third");
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[rstest]
    #[case::inside_prefix(vec![0, 0])]
    #[case::inside_payload(vec![0, 0, 0, 5, b'a', b'b'])]
    #[case::before_anything(vec![])]
    fn truncated_streams_report_closed(#[case] bytes: Vec<u8>) {
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn partial_reads_and_interrupts_are_retried() {
        let mut reader = ScriptedReader::new(vec![
            Ok(vec![0, 0]),
            Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
            Ok(vec![0, 3, b'x']),
            Ok(vec![b'y', b'z']),
        ]);
        assert_eq!(read_frame(&mut reader).expect("frame"), b"xyz");
    }

    #[test]
    fn timeouts_keep_partial_data_while_waiting() {
        let mut reader = ScriptedReader::new(vec![
            Ok(vec![0, 0, 0]),
            timeout(),
            Ok(vec![2, b'o']),
            timeout(),
            Ok(vec![b'k']),
        ]);
        let mut polls = 0;
        let payload = read_frame_until(&mut reader, || {
            polls += 1;
            true
        })
        .expect("frame");
        assert_eq!(payload, b"ok");
        assert_eq!(polls, 2);
    }

    #[test]
    fn timeouts_cancel_when_caller_stops_waiting() {
        let mut reader = ScriptedReader::new(vec![timeout(), Ok(vec![0, 0, 0, 0])]);
        assert!(matches!(
            read_frame_until(&mut reader, || false),
            Err(FrameError::Cancelled)
        ));
    }

    #[test]
    fn resets_are_reported_as_closed() {
        let mut reader = ScriptedReader::new(vec![Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset",
        ))]);
        let error = read_frame(&mut reader).expect_err("reset");
        assert!(error.is_disconnect());
    }

    #[test]
    fn other_errors_surface_as_io() {
        let mut reader = ScriptedReader::new(vec![Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "nope",
        ))]);
        assert!(matches!(read_frame(&mut reader), Err(FrameError::Io(_))));
    }
}
