//! Domain registry.
//!
//! Domains are nothing more than engine tables: creating a domain creates
//! an empty table, deleting one drops it, and the domain list is the
//! engine's table list. The registry adds name validation and logging.

use lorekeep_core::names::is_valid_domain_name;
use lorekeep_core::{Error, Result, validate_domain_name};

use crate::engine::StorageEngine;

/// Create (or reset) a domain.
///
/// An existing domain of the same name is replaced by an empty one.
pub async fn create(engine: &dyn StorageEngine, name: &str) -> Result<()> {
    validate_domain_name(name)?;
    engine.create_table(name).await?;
    log::info!("Created domain '{name}' ({} engine)", engine.name());
    Ok(())
}

/// Delete a domain and every document in it.
pub async fn delete(engine: &dyn StorageEngine, name: &str) -> Result<()> {
    if !is_valid_domain_name(name) {
        return Err(unknown_domain(name));
    }
    engine.drop_table(name).await?;
    log::info!("Deleted domain '{name}'");
    Ok(())
}

/// List all domains, sorted by name.
pub async fn list(engine: &dyn StorageEngine) -> Result<Vec<String>> {
    let mut names = engine.table_names().await?;
    names.sort_unstable();
    names.dedup();
    Ok(names)
}

/// Check that `name` refers to a live domain.
pub async fn resolve(engine: &dyn StorageEngine, name: &str) -> Result<()> {
    if is_valid_domain_name(name) && engine.has_table(name).await? {
        Ok(())
    } else {
        Err(unknown_domain(name))
    }
}

pub(crate) fn unknown_domain(name: &str) -> Error {
    Error::not_found(format!("domain '{name}'"))
}
