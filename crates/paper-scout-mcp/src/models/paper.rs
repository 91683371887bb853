//! Paper data model shared by all sources.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SourceKind;

/// Identity of a paper: the source that can resolve it plus that
/// source's local id, rendered as `"arxiv:2503.01469"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaperId {
    /// Source that owns the id.
    pub source: SourceKind,
    /// Source-local identifier.
    pub id: String,
}

impl PaperId {
    /// Create a new identity.
    #[must_use]
    pub fn new(source: SourceKind, id: impl Into<String>) -> Self {
        Self { source, id: id.into() }
    }
}

impl std::fmt::Display for PaperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

impl std::str::FromStr for PaperId {
    type Err = ParsePaperIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, id) = s
            .split_once(':')
            .ok_or_else(|| ParsePaperIdError { input: s.to_string() })?;
        let source: SourceKind =
            source.parse().map_err(|_| ParsePaperIdError { input: s.to_string() })?;
        if id.is_empty() {
            return Err(ParsePaperIdError { input: s.to_string() });
        }
        Ok(Self { source, id: id.to_string() })
    }
}

impl Serialize for PaperId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaperId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when an identity string does not parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed identity '{input}' (expected '<source>:<id>', e.g. 'arxiv:2503.01469')")]
pub struct ParsePaperIdError {
    /// The rejected input.
    pub input: String,
}

/// A paper normalized from any provider record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Identity (unique within a result set).
    pub id: PaperId,

    /// Paper title.
    pub title: String,

    /// Author names in publication order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Paper abstract.
    #[serde(default)]
    pub abstract_text: Option<String>,

    /// Publication date.
    #[serde(default)]
    pub published: Option<NaiveDate>,

    /// Landing page URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Direct PDF URL, when the provider exposes one.
    #[serde(default)]
    pub pdf_url: Option<String>,

    /// arXiv id as reported by the provider (may carry a version
    /// suffix); used for cross-source canonical matching.
    #[serde(default)]
    pub arxiv_id: Option<String>,

    /// DOI; used for cross-source canonical matching.
    #[serde(default)]
    pub doi: Option<String>,

    /// Every source that reported this paper. Grows as duplicates are
    /// merged; never shrinks.
    #[serde(default)]
    pub provenance: BTreeSet<SourceKind>,

    /// Cached embedding vector, populated by the ranker.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Paper {
    /// Create a paper with its owning source already in provenance.
    #[must_use]
    pub fn new(id: PaperId, title: impl Into<String>) -> Self {
        let mut provenance = BTreeSet::new();
        provenance.insert(id.source);
        Self {
            id,
            title: title.into(),
            authors: Vec::new(),
            abstract_text: None,
            published: None,
            url: None,
            pdf_url: None,
            arxiv_id: None,
            doi: None,
            provenance,
            embedding: None,
        }
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }

    /// Get the first author's name if available.
    #[must_use]
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Text used for semantic ranking: title plus abstract.
    #[must_use]
    pub fn ranking_text(&self) -> String {
        match &self.abstract_text {
            Some(abs) => format!("{}\n\n{abs}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Strip a trailing arXiv version suffix like `v2`. Handles both
/// new-style (`2503.01469v1`) and old-style (`hep-th/9901001v2`) ids.
#[must_use]
pub fn strip_arxiv_version(id: &str) -> &str {
    if let Some(pos) = id.rfind('v') {
        let rest = &id[pos + 1..];
        if pos > 0 && !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return &id[..pos];
        }
    }
    id
}

/// A paper with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPaper {
    /// The paper.
    pub paper: Paper,
    /// Relevance score (cosine similarity or lexical overlap, plus
    /// recency boost).
    pub score: f64,
}

/// Outcome of one source's participation in a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceStatus {
    /// Source answered; `count` records before deduplication.
    Ok {
        /// Records returned by this source.
        count: usize,
    },
    /// Source failed or timed out; results exclude it.
    Unavailable {
        /// Why the source could not be used.
        message: String,
    },
}

/// Final result of a search: ranked papers plus per-source status.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Ranked papers, best first, at most the requested limit.
    pub papers: Vec<RankedPaper>,

    /// Status of every source the query selected.
    pub sources: std::collections::BTreeMap<SourceKind, SourceStatus>,

    /// True when ranking fell back to lexical ordering because the
    /// embedding service was unavailable.
    pub degraded: bool,
}

impl SearchOutcome {
    /// Number of sources that answered.
    #[must_use]
    pub fn available_sources(&self) -> usize {
        self.sources.values().filter(|s| matches!(s, SourceStatus::Ok { .. })).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_id_display() {
        let id = PaperId::new(SourceKind::Arxiv, "2503.01469");
        assert_eq!(id.to_string(), "arxiv:2503.01469");
    }

    #[test]
    fn test_paper_id_parse() {
        let id: PaperId = "s2:649def34f8be52c8b66281af98ae884c09aef38b".parse().unwrap();
        assert_eq!(id.source, SourceKind::S2);
        assert_eq!(id.id, "649def34f8be52c8b66281af98ae884c09aef38b");
    }

    #[test]
    fn test_paper_id_parse_keeps_colons_in_id() {
        let id: PaperId = "hf:some:odd:id".parse().unwrap();
        assert_eq!(id.id, "some:odd:id");
    }

    #[test]
    fn test_paper_id_parse_rejects_malformed() {
        assert!("no-colon".parse::<PaperId>().is_err());
        assert!("pubmed:123".parse::<PaperId>().is_err());
        assert!("arxiv:".parse::<PaperId>().is_err());
        assert!(String::new().parse::<PaperId>().is_err());
    }

    #[test]
    fn test_paper_id_serde_as_string() {
        let id = PaperId::new(SourceKind::Hf, "2503.01469");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""hf:2503.01469""#);

        let back: PaperId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_strip_arxiv_version() {
        assert_eq!(strip_arxiv_version("2503.01469v2"), "2503.01469");
        assert_eq!(strip_arxiv_version("2503.01469"), "2503.01469");
        assert_eq!(strip_arxiv_version("hep-th/9901001v12"), "hep-th/9901001");
        // A bare "v" or non-numeric tail is not a version suffix
        assert_eq!(strip_arxiv_version("v1"), "v1");
        assert_eq!(strip_arxiv_version("2503.01469va"), "2503.01469va");
    }

    #[test]
    fn test_ranking_text() {
        let mut paper = Paper::new(PaperId::new(SourceKind::Arxiv, "1"), "A Title");
        assert_eq!(paper.ranking_text(), "A Title");

        paper.abstract_text = Some("An abstract.".to_string());
        assert_eq!(paper.ranking_text(), "A Title\n\nAn abstract.");
    }

    #[test]
    fn test_paper_new_seeds_provenance() {
        let paper = Paper::new(PaperId::new(SourceKind::Arxiv, "1"), "T");
        assert!(paper.provenance.contains(&SourceKind::Arxiv));
        assert_eq!(paper.provenance.len(), 1);
    }

    #[test]
    fn test_paper_deserialize_minimal() {
        let json = r#"{"id": "arxiv:2503.01469", "title": "Test"}"#;
        let paper: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.id.source, SourceKind::Arxiv);
        assert!(paper.authors.is_empty());
        assert!(paper.published.is_none());
    }

    #[test]
    fn test_source_status_serde() {
        let ok = SourceStatus::Ok { count: 5 };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["count"], 5);

        let down = SourceStatus::Unavailable { message: "timeout".to_string() };
        let json = serde_json::to_value(&down).unwrap();
        assert_eq!(json["status"], "unavailable");
    }
}
