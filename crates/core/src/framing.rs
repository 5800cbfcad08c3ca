//! Message framing over a byte stream with no length prefix.
//!
//! One connection carries exactly one request and (for GET) one
//! response. Neither direction declares its length; the reader
//! accumulates fixed-size reads until the stream ends or a read comes
//! back short.
//!
//! # Termination Rule
//!
//! [`read_message`] stops when either:
//! - the underlying read reports end-of-stream (0 bytes), or
//! - a read returns fewer bytes than [`READ_CHUNK`], taken as a
//!   heuristic "no more data is coming" signal.
//!
//! # Known Weakness
//!
//! The short-read heuristic cannot distinguish "message complete" from
//! "more data in flight" when a message's length is an exact multiple of
//! [`READ_CHUNK`] and the sender keeps the connection open, or when the
//! network delivers a full buffer at a read boundary. The protocol works
//! around this by having each side stop writing (the client half-closes,
//! the server closes) immediately after one full message. This framing
//! is NOT valid for multi-message connections; those need an explicit
//! length or delimiter instead.

use std::io::{ErrorKind, Read, Write};

use crate::error::Result;

/// Fixed read buffer size; also the short-read threshold.
pub const READ_CHUNK: usize = 1024;

/// Read one whole message off a connection.
///
/// Returns the accumulated bytes, which may be empty if the peer closed
/// without writing anything.
///
/// # Errors
/// Any read error other than clean end-of-stream. An interrupted read is
/// retried rather than surfaced.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut message = Vec::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        message.extend_from_slice(&buf[..n]);

        if n < READ_CHUNK {
            break;
        }
    }

    Ok(message)
}

/// Write one whole message to a connection.
///
/// The entire byte sequence is written and flushed before returning;
/// a partial write surfaces as an I/O error.
pub fn write_message<W: Write>(writer: &mut W, message: &[u8]) -> Result<()> {
    writer.write_all(message)?;
    writer.flush()?;
    Ok(())
}
