//! MCP tool implementations.
//!
//! Each tool module provides functions that:
//! 1. Parse and validate input parameters
//! 2. Call the search pipeline
//! 3. Format results as Markdown or JSON

mod export;
mod fetch;
mod search;

pub use export::ExportReferencesTool;
pub use fetch::FetchPaperTool;
pub use search::SearchPapersTool;

use std::sync::Arc;

use crate::error::ToolResult;
use crate::pipeline::SearchPipeline;

/// Tool execution context.
#[derive(Debug)]
pub struct ToolContext {
    /// Shared search pipeline.
    pub pipeline: Arc<SearchPipeline>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(pipeline: Arc<SearchPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_papers").
    fn name(&self) -> &'static str;

    /// Tool description for the LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        Box::new(search::SearchPapersTool),
        Box::new(fetch::FetchPaperTool),
        Box::new(export::ExportReferencesTool),
    ]
}
