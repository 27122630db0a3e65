//! Versioned JSON envelopes for document columns.
//!
//! Every JSONB document is written as `{"schema_version": N, "body": ...}`.
//! Readers accept any version up to [`CURRENT_SCHEMA_VERSION`] and rely on
//! `#[serde(default)]` on the body types to fill fields added later. A bare
//! document with no envelope is read as version 0.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema_version: u32,
    body: T,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Document schema version {found} is newer than this build supports")]
    UnsupportedVersion { found: u32 },

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wrap `body` at the current schema version.
pub fn encode<T: Serialize>(body: &T) -> Result<Value, EnvelopeError> {
    Ok(serde_json::to_value(Envelope {
        schema_version: CURRENT_SCHEMA_VERSION,
        body,
    })?)
}

/// Unwrap and deserialize a stored document.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, EnvelopeError> {
    let is_envelope = value
        .as_object()
        .is_some_and(|o| o.contains_key("schema_version") && o.contains_key("body"));
    if !is_envelope {
        return Ok(serde_json::from_value(value)?);
    }

    let envelope: Envelope<Value> = serde_json::from_value(value)?;
    if envelope.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(EnvelopeError::UnsupportedVersion {
            found: envelope.schema_version,
        });
    }
    Ok(serde_json::from_value(envelope.body)?)
}

/// [`encode`] for optional columns.
pub fn encode_opt<T: Serialize>(body: Option<&T>) -> Result<Option<Value>, EnvelopeError> {
    body.map(encode).transpose()
}

/// [`decode`] for optional columns.
pub fn decode_opt<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>, EnvelopeError> {
    value.map(decode).transpose()
}
