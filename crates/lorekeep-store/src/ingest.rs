//! Document ingestion.

use lorekeep_core::{Document, Error, Result};

use crate::engine::StorageEngine;
use crate::registry;

/// Append `document` to `domain`.
///
/// Checks run in order: the domain must exist, the text must be
/// non-empty, and metadata must serialize. Only then is the row handed to
/// the engine, which embeds and writes it atomically.
pub async fn add(engine: &dyn StorageEngine, domain: &str, document: Document) -> Result<()> {
    registry::resolve(engine, domain).await?;

    if document.text.trim().is_empty() {
        return Err(Error::invalid_input("knowledge text must not be empty"));
    }

    let record = document.into_record()?;
    let chars = record.text.chars().count();
    engine.add(domain, record).await?;

    log::debug!("Added {chars} chars of knowledge to domain '{domain}'");
    Ok(())
}
