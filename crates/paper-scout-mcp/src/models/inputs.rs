//! Input models for MCP tool parameters.
//!
//! All inputs use camelCase field names to match the tool JSON Schemas.
//! Dates and source names arrive as strings and are validated by the
//! pipeline so rejections carry a field name, not a serde path.

use serde::{Deserialize, Serialize};

use super::{ExportFormat, ResponseFormat};
use crate::config::defaults;

/// Input for the `search_papers` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPapersInput {
    /// Research query (e.g., "state space models for long sequences").
    pub query: String,

    /// Maximum papers to return.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Source allow-list ("arxiv", "hf", "s2"); all sources when
    /// omitted or empty.
    #[serde(default)]
    pub sources: Option<Vec<String>>,

    /// Earliest publication date, inclusive (YYYY-MM-DD).
    #[serde(default)]
    pub date_from: Option<String>,

    /// Latest publication date, inclusive (YYYY-MM-DD).
    #[serde(default)]
    pub date_to: Option<String>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_limit() -> usize {
    defaults::DEFAULT_RESULTS
}

/// Input for the `fetch_paper` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPaperInput {
    /// Paper identity, e.g. "arxiv:2503.01469".
    pub identity: String,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for the `export_references` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReferencesInput {
    /// Paper identities to export.
    pub identities: Vec<String>,

    /// Reference format.
    #[serde(default)]
    pub format: ExportFormat,

    /// Include abstracts in the export.
    #[serde(default = "default_true")]
    pub include_abstract: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_input_defaults() {
        let input: SearchPapersInput =
            serde_json::from_value(serde_json::json!({"query": "test"})).unwrap();
        assert_eq!(input.query, "test");
        assert_eq!(input.limit, defaults::DEFAULT_RESULTS);
        assert!(input.sources.is_none());
        assert!(input.date_from.is_none());
        assert!(input.response_format.is_markdown());
    }

    #[test]
    fn test_search_input_camel_case() {
        let input: SearchPapersInput = serde_json::from_value(serde_json::json!({
            "query": "test",
            "dateFrom": "2025-01-01",
            "responseFormat": "json"
        }))
        .unwrap();
        assert_eq!(input.date_from.as_deref(), Some("2025-01-01"));
        assert!(input.response_format.is_json());
    }

    #[test]
    fn test_search_input_requires_query() {
        let result =
            serde_json::from_value::<SearchPapersInput>(serde_json::json!({"limit": 5}));
        assert!(result.is_err());
    }

    #[test]
    fn test_export_input_defaults() {
        let input: ExportReferencesInput =
            serde_json::from_value(serde_json::json!({"identities": ["arxiv:1"]})).unwrap();
        assert_eq!(input.format, ExportFormat::Bibtex);
        assert!(input.include_abstract);
    }

    #[test]
    fn test_fetch_input() {
        let input: FetchPaperInput =
            serde_json::from_value(serde_json::json!({"identity": "arxiv:2503.01469"}))
                .unwrap();
        assert_eq!(input.identity, "arxiv:2503.01469");
    }
}
