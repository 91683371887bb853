//! Enumeration types for sources and tool parameters.

use serde::{Deserialize, Serialize};

/// A paper source known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// arXiv export API (Atom XML).
    Arxiv,
    /// Hugging Face daily-papers feed.
    Hf,
    /// Semantic Scholar Graph API.
    S2,
}

impl SourceKind {
    /// All sources, in the order they are queried.
    pub const ALL: [Self; 3] = [Self::Arxiv, Self::Hf, Self::S2];

    /// The wire name of this source, as used in identities and inputs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::Hf => "hf",
            Self::S2 => "s2",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Required because `SearchError::Source` has a field named `source`, which
// thiserror infers as the `Error::source()` value.
impl std::error::Error for SourceKind {}

impl std::str::FromStr for SourceKind {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arxiv" => Ok(Self::Arxiv),
            "hf" => Ok(Self::Hf),
            "s2" => Ok(Self::S2),
            _ => Err(UnknownSource { name: s.to_string() }),
        }
    }
}

/// Error returned when parsing an unrecognized source name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown source '{name}' (expected one of: arxiv, hf, s2)")]
pub struct UnknownSource {
    /// The unrecognized name.
    pub name: String,
}

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is markdown format.
    #[must_use]
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }

    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Export format for reference managers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// BibTeX format.
    #[default]
    Bibtex,
    /// Research Information Systems format.
    Ris,
    /// Comma-separated values.
    Csv,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bibtex => "bib",
            Self::Ris => "ris",
            Self::Csv => "csv",
        }
    }
}
