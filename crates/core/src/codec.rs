//! Wire encoding for requests, responses, and histogram payloads.
//!
//! A request is a single operation code byte, optionally followed by a
//! JSON histogram body:
//!
//! ```text
//! +-------------------+
//! | op code (1 byte)  |  0x00 = ADD, 0x01 = GET
//! +-------------------+
//! | JSON body         |  ADD only; GET carries no payload
//! | (variable)        |
//! +-------------------+
//! ```
//!
//! # Body Format
//!
//! The body is a self-describing JSON document:
//!
//! ```text
//! {"filePath": "/data/a.bin", "statistics": {"0x41": 2, "0x42": 1}}
//! ```
//!
//! Statistics keys are lowercase `0x`-prefixed hex byte values without
//! zero padding (`"0x0"` through `"0xff"`), matching Rust's `{:#x}`
//! formatting. A GET response is the same document with an empty
//! `filePath`.
//!
//! # Round Trip
//!
//! `decode_histogram(encode_histogram(h))` reproduces the same
//! (byte value, count) pairs as `h`; key order in the JSON text is not
//! significant. Entries whose count decodes to zero are dropped rather
//! than stored (see [`crate::histogram`] invariants).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Error, Result};
use crate::histogram::ByteHistogram;

/// Operation code for submitting one file's histogram.
pub const OP_ADD: u8 = 0x00;

/// Operation code for fetching the global aggregate.
pub const OP_GET: u8 = 0x01;

/// A decoded protocol request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Merge this histogram into the aggregate.
    Add(ByteHistogram),

    /// Return the current aggregate snapshot.
    Get,
}

/// JSON shape of a histogram on the wire.
///
/// Kept private: the rest of the crate works with [`ByteHistogram`] and
/// its `u8` keys; hex tokens exist only at this boundary.
#[derive(Debug, Serialize, Deserialize)]
struct WireHistogram {
    #[serde(rename = "filePath")]
    file_path: String,

    #[serde(rename = "statistics")]
    statistics: BTreeMap<String, u64>,
}

/// Render a byte value as its wire key token (`"0x0"`..`"0xff"`).
pub fn byte_token(byte: u8) -> String {
    format!("{byte:#x}")
}

fn parse_byte_token(token: &str) -> Result<u8> {
    let hex = token
        .strip_prefix("0x")
        .ok_or_else(|| DecodeError::InvalidByteToken {
            token: token.to_string(),
        })?;

    u8::from_str_radix(hex, 16).map_err(|_| {
        DecodeError::InvalidByteToken {
            token: token.to_string(),
        }
        .into()
    })
}

/// Serialize a histogram into its JSON body.
pub fn encode_histogram(histogram: &ByteHistogram) -> Result<Vec<u8>> {
    let wire = WireHistogram {
        file_path: histogram.source.clone(),
        statistics: histogram
            .iter()
            .map(|(byte, count)| (byte_token(byte), count))
            .collect(),
    };

    serde_json::to_vec(&wire).map_err(|e| DecodeError::Payload(e).into())
}

/// Deserialize a histogram from its JSON body.
///
/// # Errors
/// - `DecodeError::Payload` if the body is not valid JSON of the
///   expected structural shape (truncated, wrong types, negative counts)
/// - `DecodeError::InvalidByteToken` if a statistics key is not a
///   `0x`-prefixed hex byte value in range
pub fn decode_histogram(body: &[u8]) -> Result<ByteHistogram> {
    let wire: WireHistogram =
        serde_json::from_slice(body).map_err(DecodeError::Payload)?;

    let mut histogram = ByteHistogram::new(wire.file_path);
    for (token, count) in &wire.statistics {
        histogram.insert(parse_byte_token(token)?, *count);
    }

    Ok(histogram)
}

/// Serialize a request: operation code byte plus body.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    match request {
        Request::Add(histogram) => {
            let body = encode_histogram(histogram)?;
            let mut bytes = Vec::with_capacity(1 + body.len());
            bytes.push(OP_ADD);
            bytes.extend_from_slice(&body);
            Ok(bytes)
        }
        Request::Get => Ok(vec![OP_GET]),
    }
}

/// Deserialize a request from raw message bytes.
///
/// Bytes after a GET operation code are ignored: GET carries no payload
/// and the peer is not required to send exactly one byte.
///
/// # Errors
/// - `DecodeError::EmptyRequest` if no bytes were received
/// - `Error::UnknownOperation` if the leading code is not ADD or GET
/// - Any `decode_histogram` error for a malformed ADD body
pub fn decode_request(message: &[u8]) -> Result<Request> {
    let (&code, body) = message
        .split_first()
        .ok_or(DecodeError::EmptyRequest)?;

    match code {
        OP_ADD => Ok(Request::Add(decode_histogram(body)?)),
        OP_GET => Ok(Request::Get),
        other => Err(Error::UnknownOperation(other)),
    }
}
