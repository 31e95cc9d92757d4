//! Search request and result types.
//!
//! A search returns a flat sequence of [`SearchItem`]s. Each item is either
//! a hit from one domain or a partial-failure marker standing in for a
//! domain whose search failed. Callers must check the kind of every item.

use lorekeep_core::metadata::{self, Metadata};
use lorekeep_core::{Error, ErrorKind, Result, StoredMatch};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

/// Parameters for a knowledge search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query (embedded by the storage engine).
    pub query: String,

    /// Restrict the search to one domain; all domains when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Maximum hits *per domain*; the store default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Create a fan-out request for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Restrict to a single domain.
    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the per-domain limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// A single matching document, tagged with its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Stored text.
    pub text: String,

    /// Stored provenance.
    pub source: Option<String>,

    /// Deserialized metadata.
    pub metadata: Option<Metadata>,

    /// Distance from the query (lower is closer). Only comparable
    /// between hits of the same domain.
    pub distance: f32,

    /// Domain the hit came from.
    pub domain: String,
}

impl Hit {
    /// Build a hit from an engine match, decoding its metadata.
    pub fn from_match(domain: &str, stored: StoredMatch) -> Result<Self> {
        let metadata = metadata::decode(stored.metadata.as_deref())?;
        Ok(Self {
            text: stored.text,
            source: stored.source,
            metadata,
            distance: stored.distance,
            domain: domain.to_string(),
        })
    }
}

/// A domain whose search failed during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailure {
    /// Domain that failed.
    pub domain: String,

    /// What kind of failure it was.
    pub error: ErrorKind,

    /// Human-readable description.
    pub message: String,
}

impl PartialFailure {
    /// Describe `err` as the failure of `domain`.
    pub fn new(domain: &str, err: &Error) -> Self {
        Self {
            domain: domain.to_string(),
            error: err.kind(),
            message: format!("Failed to search domain '{domain}': {err}"),
        }
    }
}

/// One element of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchItem {
    /// A matching document.
    Hit(Hit),
    /// A domain that could not be searched.
    PartialFailure(PartialFailure),
}

impl SearchItem {
    /// The hit, if this item is one.
    pub fn as_hit(&self) -> Option<&Hit> {
        match self {
            Self::Hit(hit) => Some(hit),
            Self::PartialFailure(_) => None,
        }
    }

    /// The failure marker, if this item is one.
    pub fn as_failure(&self) -> Option<&PartialFailure> {
        match self {
            Self::Hit(_) => None,
            Self::PartialFailure(failure) => Some(failure),
        }
    }

    /// Domain this item belongs to.
    pub fn domain(&self) -> &str {
        match self {
            Self::Hit(hit) => &hit.domain,
            Self::PartialFailure(failure) => &failure.domain,
        }
    }
}
