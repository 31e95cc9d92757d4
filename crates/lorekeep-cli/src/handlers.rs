//! Command handlers.
//!
//! Knowledge commands are translated into tool calls on
//! [`KnowledgeTools`], so the CLI and any other tool host share one
//! argument and response format.

use std::path::PathBuf;

use lorekeep_core::{Error, Result};
use lorekeep_store::KnowledgeStore;
use lorekeep_tools::{KnowledgeTools, ToolError, ToolRegistry};
use serde_json::{Map, Value, json};

use crate::cli::{Command, ConfigAction};
use crate::config::LorekeepConfig;

// ============================================================================
// Knowledge commands
// ============================================================================

/// Map a knowledge command to a tool name and its arguments.
///
/// Returns `Ok(None)` for commands that are not knowledge operations.
pub fn tool_call(command: &Command) -> Result<Option<(&'static str, Value)>> {
    let call = match command {
        Command::Create { name } => ("create_domain", json!({ "name": name })),
        Command::Delete { name } => ("delete_domain", json!({ "name": name })),
        Command::List => ("list_domains", json!({})),
        Command::Add {
            domain,
            text,
            source,
            metadata,
        } => {
            let mut args = Map::new();
            args.insert("domain".into(), json!(domain));
            args.insert("text".into(), json!(text));
            if let Some(source) = source {
                args.insert("source".into(), json!(source));
            }
            if let Some(raw) = metadata {
                let parsed: Value = serde_json::from_str(raw).map_err(|e| {
                    Error::invalid_input(format!("--metadata is not valid JSON: {e}"))
                })?;
                args.insert("metadata".into(), parsed);
            }
            ("add_knowledge", Value::Object(args))
        }
        Command::Search {
            query,
            domain,
            limit,
        } => {
            let mut args = Map::new();
            args.insert("query".into(), json!(query));
            if let Some(domain) = domain {
                args.insert("domain".into(), json!(domain));
            }
            if let Some(limit) = limit {
                args.insert("limit".into(), json!(limit));
            }
            ("search", Value::Object(args))
        }
        Command::Tools | Command::Config(_) | Command::Version => return Ok(None),
    };
    Ok(Some(call))
}

/// Run one tool call against `store` and return the rendered output.
pub async fn run_tool(store: KnowledgeStore, name: &str, args: Value) -> Result<String> {
    let tools = KnowledgeTools::new(store);
    let future = tools
        .call(name, args)
        .ok_or_else(|| Error::invalid_input(format!("unknown tool '{name}'")))?;
    let output = future.await.map_err(into_error)?;
    Ok(output.render())
}

/// Tool definitions as pretty JSON.
pub fn describe_tools(config: &LorekeepConfig) -> Result<String> {
    let defs = KnowledgeTools::describe(&config.store);
    serde_json::to_string_pretty(&defs).map_err(|e| Error::config(e.to_string()))
}

fn into_error(err: ToolError) -> Error {
    match err {
        ToolError::Operation(err) => err,
        ToolError::InvalidParams(msg) => Error::invalid_input(msg),
        ToolError::Internal(msg) => Error::storage(msg),
    }
}

// ============================================================================
// Config commands
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path because `path` and `init` work before a
/// config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = LorekeepConfig::resolve_config_path(config_path).ok_or_else(|| {
                Error::config("Could not determine config directory for this platform")
            })?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `lorekeep config init` to create it)");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = LorekeepConfig::load(config_path)?;
            println!("{}", show_config(&config)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => LorekeepConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            init_config(&path, force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
    }
}

/// Effective configuration as pretty JSON, with the API key masked.
pub fn show_config(config: &LorekeepConfig) -> Result<String> {
    let mut shown = config.clone();
    if shown.store.api_key.is_some() {
        shown.store.api_key = Some("********".to_string());
    }
    serde_json::to_string_pretty(&shown).map_err(|e| Error::config(e.to_string()))
}

/// Write a default configuration file to `path`.
pub fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, LorekeepConfig::default().to_toml_string()?)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
