//! Search tool: search_papers.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{ResponseFormat, SearchPapersInput};

/// Multi-source paper search tool.
pub struct SearchPapersTool;

#[async_trait::async_trait]
impl McpTool for SearchPapersTool {
    fn name(&self) -> &'static str {
        "search_papers"
    }

    fn description(&self) -> &'static str {
        "Search arXiv, Hugging Face papers, and Semantic Scholar for research papers \
         matching a natural-language query. Results are merged across sources, \
         deduplicated, and ranked by semantic relevance. Each entry carries an \
         identity usable with fetch_paper and export_references."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., 'sparse mixture of experts routing')"
                },
                "limit": {
                    "type": "integer",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 50,
                    "description": "Maximum papers to return"
                },
                "sources": {
                    "type": "array",
                    "items": {"type": "string", "enum": ["arxiv", "hf", "s2"]},
                    "description": "Restrict the search to these sources (default: all)"
                },
                "dateFrom": {
                    "type": "string",
                    "description": "Earliest publication date (YYYY-MM-DD)"
                },
                "dateTo": {
                    "type": "string",
                    "description": "Latest publication date (YYYY-MM-DD)"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchPapersInput = serde_json::from_value(input)?;

        let query = ctx.pipeline.validate_search(&params)?;
        let outcome = ctx.pipeline.search(&query).await?;

        tracing::info!(
            query = %query.text,
            results = outcome.papers.len(),
            available = outcome.available_sources(),
            degraded = outcome.degraded,
            "search complete"
        );

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_outcome_markdown(&outcome)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::outcome_json(&outcome))?)
            }
        }
    }
}
