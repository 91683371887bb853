//! Validated search query passed to sources and the ranker.

use chrono::NaiveDate;

use super::SourceKind;

/// A validated search request. Built by the pipeline's validation
/// step; immutable afterwards.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text query.
    pub text: String,

    /// Maximum papers in the final result.
    pub limit: usize,

    /// Sources to query.
    pub sources: Vec<SourceKind>,

    /// Earliest publication date, inclusive.
    pub date_from: Option<NaiveDate>,

    /// Latest publication date, inclusive.
    pub date_to: Option<NaiveDate>,
}

impl SearchQuery {
    /// Create a query over all sources with no date constraints.
    #[must_use]
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            sources: SourceKind::ALL.to_vec(),
            date_from: None,
            date_to: None,
        }
    }

    /// Query text with whitespace collapsed and lowercased, used for
    /// cache signatures so trivially different spellings share entries.
    #[must_use]
    pub fn normalized_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
    }

    /// Check whether a publication date passes the query's range.
    /// Papers without a date pass only when no range is set.
    #[must_use]
    pub fn date_in_range(&self, published: Option<NaiveDate>) -> bool {
        match published {
            Some(date) => {
                self.date_from.is_none_or(|from| date >= from)
                    && self.date_to.is_none_or(|to| date <= to)
            }
            None => self.date_from.is_none() && self.date_to.is_none(),
        }
    }
}
