//! Configuration for the Lorekeep CLI.
//!
//! Provides [`LorekeepConfig`], loaded from TOML files, environment
//! variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `LOREKEEP_CONFIG` environment variable
//! 3. XDG default: `~/.config/lorekeep/config.toml`
//! 4. Built-in defaults
//!
//! `LOREKEEP_STORE_*` variables override individual `[store]` keys.

use std::path::PathBuf;

use confyg::{Confygery, env};
use lorekeep_core::{Error, Result};
use lorekeep_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LOREKEEP_CONFIG";

const ENV_PREFIX: &str = "LOREKEEP";

/// Main configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorekeepConfig {
    /// Project name, used in log lines and default paths.
    pub project_name: String,

    /// Knowledge store configuration.
    pub store: StoreConfig,
}

impl Default for LorekeepConfig {
    fn default() -> Self {
        Self {
            project_name: "lorekeep".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl LorekeepConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("store");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        log::debug!(
            "Loaded config for '{}' ({} engine, {} provider)",
            config.project_name,
            config.store.engine,
            config.store.provider
        );
        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_from(explicit, std::env::var(CONFIG_ENV).ok())
    }

    fn resolve_from(explicit: Option<&str>, from_env: Option<String>) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(|| from_env.filter(|p| !p.is_empty()).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lorekeep").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
