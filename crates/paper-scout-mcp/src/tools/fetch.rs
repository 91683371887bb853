//! Fetch tool: fetch_paper.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{FetchPaperInput, ResponseFormat};

/// Single-paper lookup tool.
pub struct FetchPaperTool;

#[async_trait::async_trait]
impl McpTool for FetchPaperTool {
    fn name(&self) -> &'static str {
        "fetch_paper"
    }

    fn description(&self) -> &'static str {
        "Fetch the full record for one paper by its identity (e.g., 'arxiv:2503.01469') \
         as returned by search_papers. Includes the complete abstract and all links."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "identity": {
                    "type": "string",
                    "description": "Paper identity, '<source>:<id>' (e.g., 'arxiv:2503.01469')"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["identity"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: FetchPaperInput = serde_json::from_value(input)?;

        let paper = ctx.pipeline.fetch(&params.identity).await?;

        tracing::info!(identity = %paper.id, "paper fetched");

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_paper_markdown(&paper)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_paper(&paper))?)
            }
        }
    }
}
