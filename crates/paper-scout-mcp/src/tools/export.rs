//! Export tool: export_references.

use serde_json::json;

use chrono::Datelike;

use super::{McpTool, ToolContext};
use crate::error::{SearchError, ToolError, ToolResult};
use crate::models::{ExportFormat, ExportReferencesInput, Paper};

/// Reference export tool.
pub struct ExportReferencesTool;

#[async_trait::async_trait]
impl McpTool for ExportReferencesTool {
    fn name(&self) -> &'static str {
        "export_references"
    }

    fn description(&self) -> &'static str {
        "Export papers as reference manager entries (BibTeX, RIS, or CSV). Takes \
         identities returned by search_papers; unresolvable identities are skipped."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "identities": {
                    "type": "array",
                    "items": {"type": "string"},
                    "maxItems": 100,
                    "description": "Paper identities to export (e.g., ['arxiv:2503.01469'])"
                },
                "format": {
                    "type": "string",
                    "enum": ["bibtex", "ris", "csv"],
                    "default": "bibtex"
                },
                "includeAbstract": {
                    "type": "boolean",
                    "default": true
                }
            },
            "required": ["identities"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ExportReferencesInput = serde_json::from_value(input)?;

        if params.identities.is_empty() {
            return Err(ToolError::validation("identities", "must name at least one paper"));
        }

        let fetches = params.identities.iter().map(|id| ctx.pipeline.fetch(id));
        let results = futures::future::join_all(fetches).await;

        let mut papers = Vec::new();
        let mut first_error: Option<SearchError> = None;
        for (identity, result) in params.identities.iter().zip(results) {
            match result {
                Ok(paper) => papers.push(paper),
                Err(error) => {
                    tracing::warn!(%identity, %error, "skipping unresolvable identity");
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        if papers.is_empty() {
            if let Some(error) = first_error {
                return Err(error.into());
            }
        }

        tracing::info!(
            exported = papers.len(),
            requested = params.identities.len(),
            format = ?params.format,
            "references exported"
        );

        let output = match params.format {
            ExportFormat::Bibtex => format_bibtex(&papers, params.include_abstract),
            ExportFormat::Ris => format_ris(&papers, params.include_abstract),
            ExportFormat::Csv => format_csv(&papers, params.include_abstract),
        };

        Ok(output)
    }
}

/// Format papers as BibTeX.
fn format_bibtex(papers: &[Paper], include_abstract: bool) -> String {
    let mut output = String::new();

    for paper in papers {
        output.push_str(&format!("@article{{{},\n", bibtex_key(paper)));
        output.push_str(&format!("  title = {{{}}},\n", escape_bibtex(&paper.title)));

        if !paper.authors.is_empty() {
            output.push_str(&format!(
                "  author = {{{}}},\n",
                escape_bibtex(&paper.authors.join(" and "))
            ));
        }

        if let Some(date) = paper.published {
            output.push_str(&format!("  year = {{{}}},\n", date.year()));
        }

        if let Some(arxiv) = &paper.arxiv_id {
            output.push_str(&format!("  eprint = {{{arxiv}}},\n"));
            output.push_str("  archivePrefix = {arXiv},\n");
        }

        if let Some(doi) = &paper.doi {
            output.push_str(&format!("  doi = {{{doi}}},\n"));
        }

        if let Some(url) = &paper.url {
            output.push_str(&format!("  url = {{{url}}},\n"));
        }

        if include_abstract {
            if let Some(abs) = &paper.abstract_text {
                output.push_str(&format!("  abstract = {{{}}},\n", escape_bibtex(abs)));
            }
        }

        output.push_str("}\n\n");
    }

    output
}

/// Citation key: first author's surname plus the year.
fn bibtex_key(paper: &Paper) -> String {
    let surname = paper
        .first_author()
        .and_then(|name| name.split_whitespace().last())
        .unwrap_or("Unknown");
    let surname: String = surname.chars().filter(|c| c.is_alphanumeric()).collect();
    let year = paper.published.map(|d| d.year().to_string()).unwrap_or_default();
    format!("{surname}{year}")
}

/// Format papers as RIS.
fn format_ris(papers: &[Paper], include_abstract: bool) -> String {
    let mut output = String::new();

    for paper in papers {
        output.push_str("TY  - JOUR\n");
        output.push_str(&format!("TI  - {}\n", paper.title));

        for author in &paper.authors {
            output.push_str(&format!("AU  - {author}\n"));
        }

        if let Some(date) = paper.published {
            output.push_str(&format!("PY  - {}\n", date.year()));
        }

        if include_abstract {
            if let Some(abs) = &paper.abstract_text {
                // RIS readers choke on raw newlines inside a field
                let flat = abs.replace('\r', "").replace('\n', " ");
                output.push_str(&format!("AB  - {flat}\n"));
            }
        }

        if let Some(doi) = &paper.doi {
            output.push_str(&format!("DO  - {doi}\n"));
        }

        if let Some(url) = &paper.url {
            output.push_str(&format!("UR  - {url}\n"));
        }

        output.push_str(&format!("ID  - {}\n", paper.id));
        output.push_str("ER  - \n\n");
    }

    output
}

/// Format papers as CSV.
fn format_csv(papers: &[Paper], include_abstract: bool) -> String {
    let mut output = String::new();

    if include_abstract {
        output.push_str("id,title,authors,published,arxiv_id,doi,url,abstract\n");
    } else {
        output.push_str("id,title,authors,published,arxiv_id,doi,url\n");
    }

    for paper in papers {
        let id = paper.id.to_string();
        let title = csv_escape(&paper.title);
        let authors = csv_escape(&paper.author_names());
        let published = paper.published.map(|d| d.to_string()).unwrap_or_default();
        let arxiv = csv_escape(paper.arxiv_id.as_deref().unwrap_or(""));
        let doi = csv_escape(paper.doi.as_deref().unwrap_or(""));
        let url = csv_escape(paper.url.as_deref().unwrap_or(""));

        if include_abstract {
            let abs = csv_escape(paper.abstract_text.as_deref().unwrap_or(""));
            output.push_str(&format!(
                "{id},{title},{authors},{published},{arxiv},{doi},{url},{abs}\n"
            ));
        } else {
            output.push_str(&format!("{id},{title},{authors},{published},{arxiv},{doi},{url}\n"));
        }
    }

    output
}

/// Escape a string for BibTeX output.
fn escape_bibtex(s: &str) -> String {
    s.replace('\\', "\\textbackslash{}")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('&', "\\&")
        .replace('%', "\\%")
        .replace('$', "\\$")
        .replace('#', "\\#")
        .replace('_', "\\_")
        .replace('^', "\\textasciicircum{}")
        .replace('~', "\\textasciitilde{}")
}

/// Escape a string for CSV output, guarding against spreadsheet
/// formula injection.
fn csv_escape(s: &str) -> String {
    let needs_quotes =
        s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');
    let formula_like =
        s.starts_with('=') || s.starts_with('+') || s.starts_with('-') || s.starts_with('@');

    if needs_quotes {
        let escaped = s.replace('"', "\"\"");
        if formula_like { format!("\"'{escaped}\"") } else { format!("\"{escaped}\"") }
    } else if formula_like {
        format!("'{s}")
    } else {
        s.to_string()
    }
}
