//! The Document Schema.
//!
//! Every domain shares one fixed row shape:
//!
//! | Column | Type | Purpose |
//! |--------|------|---------|
//! | `text` | Utf8 | Source text, the only embedded field |
//! | `vector` | FixedSizeList<Float32> | Embedding of `text` |
//! | `source` | Utf8 (nullable) | Free-form provenance |
//! | `metadata` | Utf8 (nullable) | JSON-serialized metadata |
//!
//! Search results additionally carry the engine-produced `_distance`.

use serde::{Deserialize, Serialize};

use crate::metadata::{self, Metadata};
use crate::Result;

/// Column holding the source text.
pub const TEXT_COLUMN: &str = "text";
/// Column holding the embedding vector.
pub const VECTOR_COLUMN: &str = "vector";
/// Column holding the provenance string.
pub const SOURCE_COLUMN: &str = "source";
/// Column holding the JSON-serialized metadata.
pub const METADATA_COLUMN: &str = "metadata";
/// Column the storage engine adds to search results.
pub const DISTANCE_COLUMN: &str = "_distance";

/// Vector length used when none is configured.
pub const DEFAULT_DIMENSION: usize = 1536;

/// A document as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text to store and embed.
    pub text: String,

    /// Optional provenance (URL, filename, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Optional structured metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    /// Create a document with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            metadata: None,
        }
    }

    /// Set the provenance.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Convert into the row handed to a storage engine.
    ///
    /// Serializes metadata; the vector is filled in by the engine.
    pub fn into_record(self) -> Result<DocumentRecord> {
        let metadata = metadata::encode(self.metadata.as_ref())?;
        Ok(DocumentRecord {
            text: self.text,
            source: self.source,
            metadata,
        })
    }
}

/// A row ready for storage, minus its embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Text to embed.
    pub text: String,
    /// Provenance.
    pub source: Option<String>,
    /// Serialized metadata.
    pub metadata: Option<String>,
}

/// A row returned by a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatch {
    /// Stored text.
    pub text: String,
    /// Stored provenance.
    pub source: Option<String>,
    /// Stored, still serialized, metadata.
    pub metadata: Option<String>,
    /// Distance from the query vector (lower is closer).
    pub distance: f32,
}
