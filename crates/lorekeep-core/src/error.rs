//! Error types for Lorekeep operations.
//!
//! This module provides the common `Error` type and `Result<T>` alias used
//! across all Lorekeep crates. Uses `thiserror` for derive macros.
//!
//! # Taxonomy
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `NotFound` | Referenced domain does not exist |
//! | `InvalidInput` | Bad caller input (metadata, limit, query, name) |
//! | `Upstream` | Embedding provider failure |
//! | `Storage` / `Io` | Storage engine I/O or allocation failure |
//! | `Config` | Configuration could not be loaded or is inconsistent |
//!
//! Per-domain failures during a fan-out search are not errors: they are
//! reported inline as partial-failure items by the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in Lorekeep operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced domain (or other named entity) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding provider failed (timeout, quota, malformed response).
    #[error("Upstream fault: {0}")]
    Upstream(String),

    /// The storage engine failed.
    #[error("Storage fault: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`].
///
/// Serializable so that tool responses and partial-failure markers can
/// report what went wrong without carrying the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::InvalidInput`].
    InvalidInput,
    /// See [`Error::Upstream`].
    UpstreamFault,
    /// See [`Error::Storage`] and [`Error::Io`].
    StorageFault,
    /// See [`Error::Config`].
    Config,
}

impl Error {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an upstream (embedding provider) error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Upstream(_) => ErrorKind::UpstreamFault,
            Self::Storage(_) | Self::Io(_) => ErrorKind::StorageFault,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether this is a [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is an [`Error::InvalidInput`].
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using Lorekeep's Error type.
pub type Result<T> = std::result::Result<T, Error>;
