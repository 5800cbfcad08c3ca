//! Error types for the bytestat system.
//!
//! All operations return structured errors rather than panicking.
//! A failure is always contained to the connection or file it occurred
//! on: callers log it and unwind the current task only.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a failure domain from the protocol
/// contract:
/// - I/O: connection and file read/write failures
/// - Decode: malformed request or histogram payloads
/// - Unknown operation: unrecognized leading operation code
#[derive(Debug, Error)]
pub enum Error {
    /// Connection or file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request or histogram payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Leading operation code is not ADD or GET
    #[error("unknown operation code: {0:#04x}")]
    UnknownOperation(u8),
}

/// Payload decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Request contained no bytes at all (not even an operation code)
    #[error("empty request")]
    EmptyRequest,

    /// Histogram body is not well-formed JSON of the expected shape
    #[error("malformed histogram payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Statistics key is not a `0x`-prefixed hex byte value
    #[error("invalid byte-value token: {token:?}")]
    InvalidByteToken { token: String },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
