//! Tool registry abstraction.
//!
//! A tool registry advertises a set of named tools, each with a JSON
//! input schema, and dispatches calls to them. Calls return a boxed
//! future so registries can be held as trait objects.

use std::future::Future;
use std::pin::Pin;

use lorekeep_core::ErrorKind;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Description of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDef {
    /// Tool name used in calls.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// JSON Schema of the call arguments.
    pub input_schema: Value,
}

/// Successful tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A human-readable confirmation.
    Text(String),
    /// A structured response.
    Json(Value),
}

impl ToolOutput {
    /// Render as a string (pretty-printed for JSON).
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Errors returned by tool calls.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments did not match the tool's schema.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Operation(#[from] lorekeep_core::Error),

    /// The response could not be produced.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create an invalid-params error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// The store error kind, for operation failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Operation(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Result of a tool call.
pub type ToolResult = Result<ToolOutput, ToolError>;

/// Boxed future returned by [`ToolRegistry::call`].
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// A set of callable tools.
pub trait ToolRegistry: Send + Sync {
    /// All tools this registry provides.
    fn tools(&self) -> Vec<ToolDef>;

    /// Start a call to `name`; `None` if the tool is not registered here.
    fn call(&self, name: &str, args: Value) -> Option<ToolFuture>;

    /// Whether `name` is registered.
    fn has_tool(&self, name: &str) -> bool {
        self.tools().iter().any(|t| t.name == name)
    }

    /// Number of registered tools.
    fn tool_count(&self) -> usize {
        self.tools().len()
    }
}
