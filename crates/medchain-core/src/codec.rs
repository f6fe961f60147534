// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema-based binary encoding for contract records (CBOR via `ciborium`).
//!
//! Records are plain serde types; this module fixes how they become the value
//! blob of an instance. `decode_record(&encode_record(&r)?)? == r` holds for
//! every record type in the workspace.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors produced while encoding or decoding a record blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The in-memory record could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
    /// The stored blob is not a valid record.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The blob holds a valid record followed by extra bytes.
    #[error("{0} trailing bytes after record")]
    Trailing(usize),
}

/// Encodes a record into a fresh buffer.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Decodes a record blob.
///
/// A zero-length blob is the empty record (`T::default()`): instances may be
/// spawned with no initial payload and still accept their first mutation.
///
/// # Errors
///
/// - [`CodecError::Decode`] for malformed input.
/// - [`CodecError::Trailing`] when bytes remain after the record.
pub fn decode_record<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, CodecError> {
    if bytes.is_empty() {
        return Ok(T::default());
    }
    let mut rest = bytes;
    let record = ciborium::from_reader(&mut rest).map_err(|e| CodecError::Decode(e.to_string()))?;
    if !rest.is_empty() {
        return Err(CodecError::Trailing(rest.len()));
    }
    Ok(record)
}
