//! Tool surface for Lorekeep.
//!
//! Exposes the knowledge store as five named tools with JSON argument
//! schemas, suitable for driving from an agent runtime or the CLI.
//!
//! # Key Abstractions
//!
//! - `ToolRegistry` trait: advertise tools and dispatch calls
//! - `KnowledgeTools`: the registry backed by a `KnowledgeStore`

pub mod registry;
pub mod tools;

pub use registry::{ToolDef, ToolError, ToolFuture, ToolOutput, ToolResult, ToolRegistry};
pub use tools::KnowledgeTools;
