//! Markdown output formatting.

use std::borrow::Cow;

use crate::models::{Paper, RankedPaper, SearchOutcome, SourceStatus};

/// Abstracts in list views are cut at this many characters.
const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Format a full search outcome as Markdown.
#[must_use]
pub fn format_outcome_markdown(outcome: &SearchOutcome) -> String {
    let mut output = format!("# Search Results ({} papers)\n\n", outcome.papers.len());

    if outcome.degraded {
        output.push_str(
            "*Ranked by lexical term overlap; the embedding service was unavailable.*\n\n",
        );
    }

    output.push_str(&format!("**Sources**: {}\n\n", source_summary(outcome)));

    if outcome.papers.is_empty() {
        output.push_str("No papers found.\n");
        return output;
    }

    for (i, ranked) in outcome.papers.iter().enumerate() {
        output.push_str(&format_ranked_markdown(ranked, i + 1));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format one ranked entry for the list view.
#[must_use]
pub fn format_ranked_markdown(ranked: &RankedPaper, index: usize) -> String {
    let paper = &ranked.paper;
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, paper.title));
    output.push_str(&format!("**Identity**: `{}`\n\n", paper.id));

    if !paper.authors.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", paper.author_names()));
    }

    let mut meta = vec![format!("**Score**: {:.3}", ranked.score)];
    if let Some(published) = paper.published {
        meta.push(format!("**Published**: {published}"));
    }
    meta.push(format!("**Seen in**: {}", provenance_names(paper)));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    if let Some(links) = links_line(paper) {
        output.push_str(&format!("**Links**: {links}\n\n"));
    }

    if let Some(pdf_url) = &paper.pdf_url {
        output.push_str(&format!("**PDF**: [Open Access]({pdf_url})\n\n"));
    }

    if let Some(abs) = &paper.abstract_text {
        output.push_str(&format!(
            "**Abstract**: {}\n",
            truncate_chars(abs, ABSTRACT_PREVIEW_CHARS)
        ));
    }

    output
}

/// Format a single fetched paper as Markdown, with the full abstract.
#[must_use]
pub fn format_paper_markdown(paper: &Paper) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}\n\n", paper.title));
    output.push_str(&format!("**Identity**: `{}`\n\n", paper.id));

    if !paper.authors.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", paper.author_names()));
    }

    let mut meta = Vec::new();
    if let Some(published) = paper.published {
        meta.push(format!("**Published**: {published}"));
    }
    meta.push(format!("**Seen in**: {}", provenance_names(paper)));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    if let Some(links) = links_line(paper) {
        output.push_str(&format!("**Links**: {links}\n\n"));
    }

    if let Some(pdf_url) = &paper.pdf_url {
        output.push_str(&format!("**PDF**: [Open Access]({pdf_url})\n\n"));
    }

    if let Some(abs) = &paper.abstract_text {
        output.push_str(&format!("**Abstract**: {abs}\n"));
    }

    output
}

fn source_summary(outcome: &SearchOutcome) -> String {
    outcome
        .sources
        .iter()
        .map(|(kind, status)| match status {
            SourceStatus::Ok { count } => format!("{kind}: {count}"),
            SourceStatus::Unavailable { message } => format!("{kind}: unavailable ({message})"),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn provenance_names(paper: &Paper) -> String {
    paper.provenance.iter().map(|k| k.as_str().to_string()).collect::<Vec<_>>().join(", ")
}

fn links_line(paper: &Paper) -> Option<String> {
    let mut links = Vec::new();
    if let Some(arxiv) = &paper.arxiv_id {
        links.push(format!("[arXiv](https://arxiv.org/abs/{arxiv})"));
    }
    if let Some(doi) = &paper.doi {
        links.push(format!("[DOI](https://doi.org/{doi})"));
    }
    if let Some(url) = &paper.url {
        links.push(format!("[Page]({url})"));
    }
    if links.is_empty() { None } else { Some(links.join(" | ")) }
}

/// Cut at a character boundary, never inside a multi-byte sequence.
fn truncate_chars(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        None => Cow::Borrowed(text),
        Some((pos, _)) => Cow::Owned(format!("{}...", &text[..pos])),
    }
}
