//! JSON output formatting with token efficiency.

use serde_json::{Value, json};

use crate::models::{Paper, RankedPaper, SearchOutcome};

/// Create a compact paper representation for JSON output. Absent
/// fields are omitted rather than emitted as null.
#[must_use]
pub fn compact_paper(paper: &Paper) -> Value {
    let mut obj = json!({
        "id": paper.id.to_string(),
        "title": paper.title,
        "sources": paper.provenance,
    });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(paper.authors);
    }

    if let Some(published) = paper.published {
        obj["published"] = json!(published.to_string());
    }

    if let Some(abs) = &paper.abstract_text {
        obj["abstract"] = json!(abs);
    }

    if let Some(url) = &paper.url {
        obj["url"] = json!(url);
    }

    if let Some(pdf) = &paper.pdf_url {
        obj["pdf"] = json!(pdf);
    }

    if let Some(arxiv) = &paper.arxiv_id {
        obj["arxiv"] = json!(arxiv);
    }

    if let Some(doi) = &paper.doi {
        obj["doi"] = json!(doi);
    }

    obj
}

/// Compact representation of one ranked entry.
#[must_use]
pub fn compact_ranked(ranked: &RankedPaper) -> Value {
    let mut obj = compact_paper(&ranked.paper);
    obj["score"] = json!(ranked.score);
    obj
}

/// Whole-outcome JSON: ranked papers plus per-source status and the
/// degraded flag.
#[must_use]
pub fn outcome_json(outcome: &SearchOutcome) -> Value {
    json!({
        "papers": outcome.papers.iter().map(compact_ranked).collect::<Vec<_>>(),
        "sources": outcome.sources,
        "degraded": outcome.degraded,
    })
}
