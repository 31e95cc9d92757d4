//! Knowledge store tools.
//!
//! `KnowledgeTools` implements [`ToolRegistry`] by delegating to a
//! [`KnowledgeStore`]. Each call deserializes its arguments, runs one
//! store operation, and shapes the result for the caller.

use lorekeep_core::Document;
use lorekeep_store::{KnowledgeStore, SearchRequest, StoreConfig};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::registry::{ToolDef, ToolError, ToolFuture, ToolOutput, ToolRegistry, ToolResult};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_tool(name: &str, description: &str, schema: Value) -> ToolDef {
    ToolDef {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: schema,
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    // A missing arguments object is treated as an empty one.
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::invalid_params(e.to_string()))
}

fn confirm(message: String) -> ToolResult {
    Ok(ToolOutput::Text(message))
}

fn to_json<T: serde::Serialize>(value: &T) -> ToolResult {
    serde_json::to_value(value)
        .map(ToolOutput::Json)
        .map_err(|e| ToolError::Internal(e.to_string()))
}

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for `create_domain` and `delete_domain`.
#[derive(Debug, Deserialize)]
pub struct DomainArgs {
    /// Domain name.
    pub name: String,
}

/// Arguments for `add_knowledge`.
#[derive(Debug, Deserialize)]
pub struct AddKnowledgeArgs {
    /// Target domain.
    pub domain: String,
    /// Text to store.
    pub text: String,
    /// Optional provenance.
    pub source: Option<String>,
    /// Optional structured metadata.
    pub metadata: Option<Value>,
}

/// Arguments for `search`.
#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,
    /// Optional single domain.
    pub domain: Option<String>,
    /// Results per domain.
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// KnowledgeTools
// ---------------------------------------------------------------------------

/// Tools backed by a [`KnowledgeStore`].
///
/// Registers:
/// - `create_domain`: create (or reset) a domain
/// - `delete_domain`: delete a domain
/// - `list_domains`: list domain names
/// - `add_knowledge`: add a document to a domain
/// - `search`: semantic search over one or all domains
#[derive(Debug, Clone)]
pub struct KnowledgeTools {
    store: KnowledgeStore,
}

impl KnowledgeTools {
    /// Create tools over `store`.
    pub fn new(store: KnowledgeStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Tool definitions for a store configured with `config`.
    ///
    /// Lets callers advertise the tools without opening a store.
    pub fn describe(config: &StoreConfig) -> Vec<ToolDef> {
        vec![
            make_tool(
                "create_domain",
                "Create a new knowledge domain",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Domain name"
                        }
                    },
                    "required": ["name"]
                }),
            ),
            make_tool(
                "delete_domain",
                "Delete a domain",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Domain name"
                        }
                    },
                    "required": ["name"]
                }),
            ),
            make_tool(
                "list_domains",
                "List all knowledge domains",
                serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            make_tool(
                "add_knowledge",
                "Add knowledge to a domain",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "domain": {
                            "type": "string",
                            "description": "Domain to add to"
                        },
                        "text": {
                            "type": "string",
                            "description": "Knowledge text"
                        },
                        "source": {
                            "type": "string",
                            "description": "Where the knowledge came from"
                        },
                        "metadata": {
                            "description": "Arbitrary JSON metadata"
                        }
                    },
                    "required": ["domain", "text"]
                }),
            ),
            make_tool(
                "search",
                "Search for knowledge across domains",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query"
                        },
                        "domain": {
                            "type": "string",
                            "description": "Restrict the search to one domain"
                        },
                        "limit": {
                            "type": "integer",
                            "minimum": 1,
                            "description": "Maximum results per domain",
                            "default": config.default_limit
                        }
                    },
                    "required": ["query"]
                }),
            ),
        ]
    }
}

impl ToolRegistry for KnowledgeTools {
    fn tools(&self) -> Vec<ToolDef> {
        Self::describe(self.store.config())
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolFuture> {
        let store = self.store.clone();

        match name {
            "create_domain" => Some(Box::pin(async move {
                let args: DomainArgs = parse_args(args)?;
                store.create_domain(&args.name).await?;
                confirm(format!("Created domain '{}' successfully", args.name))
            })),

            "delete_domain" => Some(Box::pin(async move {
                let args: DomainArgs = parse_args(args)?;
                store.delete_domain(&args.name).await?;
                confirm(format!("Deleted domain '{}' successfully", args.name))
            })),

            "list_domains" => Some(Box::pin(async move {
                let domains = store.list_domains().await?;
                to_json(&domains)
            })),

            "add_knowledge" => Some(Box::pin(async move {
                let args: AddKnowledgeArgs = parse_args(args)?;
                let mut document = Document::new(args.text);
                if let Some(source) = args.source {
                    document = document.with_source(source);
                }
                if let Some(metadata) = args.metadata {
                    document = document.with_metadata(metadata);
                }
                store.add_knowledge(&args.domain, document).await?;
                confirm(format!("Added knowledge to domain '{}' successfully", args.domain))
            })),

            "search" => Some(Box::pin(async move {
                let args: SearchArgs = parse_args(args)?;
                let request = SearchRequest {
                    query: args.query,
                    domain: args.domain,
                    limit: args.limit,
                };
                let items = store.search(&request).await?;
                log::debug!("search returned {} item(s)", items.len());
                to_json(&items)
            })),

            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
