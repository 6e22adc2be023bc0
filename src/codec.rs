//! Record wire format.
//!
//! Structured values (objects, arrays, numbers, booleans) are stored as their
//! canonical JSON text. A string scalar is stored as-is, without quotes, and
//! decoding falls back to reading the raw text as a string when it is not
//! valid JSON.
//!
//! ## Limitations
//!
//! - A string scalar whose text is itself valid JSON is ambiguous on the way
//!   back: `"\"x\""` is stored as `"x"` with its quotes and decodes to `x`, and
//!   `"[1]"` decodes to an array wherever the target type accepts one. Records
//!   that serialize to objects are unaffected.
//! - Record ids containing `,` do not survive the index entry (see
//!   `namespace::IndexEntry`).

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Serde(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Serde(msg) => write!(f, "record serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

/// Serialize a value to its stored string form.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let value = serde_json::to_value(value).map_err(|e| CodecError::Serde(e.to_string()))?;
    match value {
        Value::String(raw) => Ok(raw),
        other => Ok(other.to_string()),
    }
}

/// Deserialize a stored string. Absent and empty values decode to `None`.
pub fn decode<T: DeserializeOwned>(data: Option<&str>) -> Result<Option<T>, CodecError> {
    let data = match data {
        Some(data) if !data.is_empty() => data,
        _ => return Ok(None),
    };

    match serde_json::from_str(data) {
        Ok(value) => Ok(Some(value)),
        Err(err) => serde_json::from_value(Value::String(data.to_string()))
            .map(Some)
            .map_err(|_| CodecError::Serde(err.to_string())),
    }
}
