//! Lorekeep Core: shared types, errors, and the document schema.
//!
//! This crate provides the foundational types used across all Lorekeep
//! crates. It has no internal Lorekeep dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`schema`]: The fixed Document Schema shared by every domain
//! - [`metadata`]: Encode/decode boundary for structured metadata
//! - [`names`]: Domain name rules

pub mod error;
pub mod metadata;
pub mod names;
pub mod schema;

// Re-export key types at crate root for convenience
pub use error::{Error, ErrorKind, Result};
pub use metadata::Metadata;
pub use names::validate_domain_name;
pub use schema::{DEFAULT_DIMENSION, Document, DocumentRecord, StoredMatch};
