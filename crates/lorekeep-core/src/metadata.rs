//! Metadata codec.
//!
//! Document metadata is an arbitrary structured value (null, number,
//! string, bool, array, object). Columnar storage has no variant type, so
//! metadata crosses the storage boundary as a JSON string. The functions in
//! this module are the only place that conversion happens.
//!
//! Absent metadata is stored as an absent value, never as `"{}"` or `""`.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Structured document metadata.
pub type Metadata = Value;

/// Convert any serializable value into [`Metadata`].
///
/// Fails with `InvalidInput` when the value has no JSON representation,
/// e.g. a map keyed by something other than strings.
pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Metadata> {
    serde_json::to_value(value)
        .map_err(|e| Error::invalid_input(format!("metadata is not representable as JSON: {e}")))
}

/// Serialize metadata for storage.
pub fn encode(metadata: Option<&Metadata>) -> Result<Option<String>> {
    metadata
        .map(|m| {
            serde_json::to_string(m)
                .map_err(|e| Error::invalid_input(format!("failed to serialize metadata: {e}")))
        })
        .transpose()
}

/// Deserialize stored metadata.
///
/// An absent or empty stored string decodes to `None`. A stored string
/// that is not JSON means the row is corrupt and yields a storage fault.
pub fn decode(stored: Option<&str>) -> Result<Option<Metadata>> {
    match stored {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => serde_json::from_str(s)
            .map(Some)
            .map_err(|e| Error::storage(format!("stored metadata is not valid JSON: {e}"))),
    }
}
