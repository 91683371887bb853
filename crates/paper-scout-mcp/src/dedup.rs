//! Cross-source record merging.
//!
//! Two records are the same paper when they share a canonical
//! identifier (arXiv id with the version stripped, else DOI), or when
//! their titles and author lists are similar enough. Merging keeps the
//! record with the richer abstract and fills its gaps from the loser,
//! so no provider metadata is silently dropped.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Paper, strip_arxiv_version};

/// Merges duplicate records produced by different sources.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
}

impl Deduplicator {
    /// Create a deduplicator with the given similarity threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Merge duplicates, preserving first-seen positions. Idempotent:
    /// running the output through again changes nothing.
    #[must_use]
    pub fn merge(&self, papers: Vec<Paper>) -> Vec<Paper> {
        let mut kept: Vec<Paper> = Vec::with_capacity(papers.len());
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for paper in papers {
            match self.find_slot(&kept, &by_key, &paper) {
                Some(index) => {
                    merge_into(&mut kept[index], paper);
                    // The merged record may have gained an identifier
                    register_keys(&mut by_key, &kept[index], index);
                }
                None => {
                    let index = kept.len();
                    register_keys(&mut by_key, &paper, index);
                    kept.push(paper);
                }
            }
        }

        kept
    }

    /// Find the kept record this candidate duplicates, if any:
    /// canonical identifier match first, then the similarity scan.
    fn find_slot(
        &self,
        kept: &[Paper],
        by_key: &HashMap<String, usize>,
        candidate: &Paper,
    ) -> Option<usize> {
        if let Some(index) = canonical_keys(candidate).iter().find_map(|k| by_key.get(k).copied())
        {
            return Some(index);
        }
        kept.iter().position(|p| similarity(p, candidate) >= self.threshold)
    }
}

/// All canonical identifiers a record carries. A record holding both an
/// arXiv id and a DOI matches future arrivals on either.
fn canonical_keys(paper: &Paper) -> Vec<String> {
    let mut keys = Vec::with_capacity(2);
    if let Some(id) = &paper.arxiv_id {
        keys.push(format!("arxiv:{}", strip_arxiv_version(id).to_lowercase()));
    }
    if let Some(doi) = &paper.doi {
        keys.push(format!("doi:{}", doi.to_lowercase()));
    }
    keys
}

fn register_keys(by_key: &mut HashMap<String, usize>, paper: &Paper, index: usize) {
    for key in canonical_keys(paper) {
        by_key.entry(key).or_insert(index);
    }
}

/// Merge `incoming` into the kept slot. The record with the richer
/// abstract wins the slot; the loser fills whatever the winner lacks.
fn merge_into(kept: &mut Paper, mut incoming: Paper) {
    if abstract_len(&incoming) > abstract_len(kept) {
        std::mem::swap(kept, &mut incoming);
    }

    if kept.abstract_text.is_none() {
        kept.abstract_text = incoming.abstract_text;
    }
    if kept.authors.is_empty() {
        kept.authors = incoming.authors;
    }
    if kept.published.is_none() {
        kept.published = incoming.published;
    }
    if kept.url.is_none() {
        kept.url = incoming.url;
    }
    if kept.pdf_url.is_none() {
        kept.pdf_url = incoming.pdf_url;
    }
    if kept.arxiv_id.is_none() {
        kept.arxiv_id = incoming.arxiv_id;
    }
    if kept.doi.is_none() {
        kept.doi = incoming.doi;
    }
    if kept.embedding.is_none() {
        kept.embedding = incoming.embedding;
    }
    kept.provenance.extend(incoming.provenance);
}

fn abstract_len(paper: &Paper) -> usize {
    paper.abstract_text.as_deref().map_or(0, str::len)
}

/// Title Jaccard times author overlap. Identical titles with disjoint
/// non-empty author sets score 0.
fn similarity(a: &Paper, b: &Paper) -> f64 {
    title_jaccard(&a.title, &b.title) * author_overlap(&a.authors, &b.authors)
}

fn title_tokens(title: &str) -> BTreeSet<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn title_jaccard(a: &str, b: &str) -> f64 {
    let ta = title_tokens(a);
    let tb = title_tokens(b);
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    ta.intersection(&tb).count() as f64 / union as f64
}

/// Surname of a normalized author name. Providers disagree on given
/// name formatting ("Ada Lovelace" vs "A. Lovelace"), surnames travel
/// intact.
fn normalized_surname(name: &str) -> Option<String> {
    name.split_whitespace()
        .last()
        .map(|s| s.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// `|A∩B| / min(|A|,|B|)` over surnames; 1.0 when either side reports
/// no authors at all.
fn author_overlap(a: &[String], b: &[String]) -> f64 {
    let sa: BTreeSet<String> = a.iter().filter_map(|n| normalized_surname(n)).collect();
    let sb: BTreeSet<String> = b.iter().filter_map(|n| normalized_surname(n)).collect();
    if sa.is_empty() || sb.is_empty() {
        return 1.0;
    }
    sa.intersection(&sb).count() as f64 / sa.len().min(sb.len()) as f64
}
