//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates its arguments (before any network call)
//! 2. Calls the DORA client once
//! 3. Formats the result as text

mod publication;
mod search;

pub use publication::*;
pub use search::*;

use std::sync::Arc;

use crate::client::DoraClient;
use crate::error::ToolResult;

/// Tool execution context.
pub struct ToolContext {
    /// DORA client.
    pub client: Arc<DoraClient>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<DoraClient>) -> Self {
        Self { client }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_publications").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Prefix of the text reported when the upstream call fails.
    fn error_prefix(&self) -> &'static str {
        "Tool error"
    }

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search tools (3)
        Box::new(search::SearchPublicationsTool),
        Box::new(search::SearchByYearTool),
        Box::new(search::SearchByDateRangeTool),

        // Publication tools (2)
        Box::new(publication::PublicationAbstractTool),
        Box::new(publication::PublicationFulltextTool),
    ]
}
