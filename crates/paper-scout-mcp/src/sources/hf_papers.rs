//! Hugging Face papers source adapter.
//!
//! The daily-papers API answers JSON. Search entries are sometimes
//! wrapped as `{"paper": {...}}` and sometimes bare, so each entry is
//! unwrapped before deserializing. The API has no server-side limit or
//! date filter; both are applied client-side.

use std::time::Duration;

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::{PaperSource, handle_response, normalize_whitespace, parse_provider_date};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, PaperId, SearchQuery, SourceKind};

/// Hugging Face papers API adapter.
pub struct HfPapersSource {
    client: ClientWithMiddleware,
    base_url: String,
    courtesy_delay: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HfPaper {
    id: String,
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    authors: Vec<HfAuthor>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HfAuthor {
    #[serde(default)]
    name: Option<String>,
}

impl HfPaper {
    fn into_paper(self) -> Paper {
        let mut paper = Paper::new(
            PaperId::new(SourceKind::Hf, self.id.clone()),
            normalize_whitespace(&self.title),
        );
        paper.authors = self.authors.into_iter().filter_map(|a| a.name).collect();
        paper.abstract_text = self
            .summary
            .as_deref()
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty());
        paper.published = self.published_at.as_deref().and_then(parse_provider_date);
        paper.url = Some(format!("https://huggingface.co/papers/{}", self.id));
        paper.pdf_url = Some(format!("https://arxiv.org/pdf/{}", self.id));
        // HF paper ids are arXiv ids
        paper.arxiv_id = Some(self.id);
        paper
    }
}

impl HfPapersSource {
    /// Create an adapter using the shared HTTP client.
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &Config) -> Self {
        Self {
            client,
            base_url: config.hf_api_url.clone(),
            courtesy_delay: config.courtesy_delay,
        }
    }

    /// Unwrap one search entry and parse it, tolerating the optional
    /// `{"paper": {...}}` envelope.
    fn parse_entry(value: &serde_json::Value) -> Option<HfPaper> {
        let inner = value.get("paper").unwrap_or(value);
        match HfPaper::deserialize(inner) {
            Ok(paper) => Some(paper),
            Err(error) => {
                tracing::debug!(%error, "skipping malformed hf entry");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl PaperSource for HfPapersSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Hf
    }

    async fn search(&self, query: &SearchQuery) -> SourceResult<Vec<Paper>> {
        tokio::time::sleep(self.courtesy_delay).await;

        let url = format!("{}/search", self.base_url);
        tracing::debug!(query = %query.text, limit = query.limit, "hf search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.text.as_str())])
            .send()
            .await?;
        let response = handle_response(response).await?;
        let entries: Vec<serde_json::Value> = response.json().await?;

        let papers = entries
            .iter()
            .filter_map(Self::parse_entry)
            .map(HfPaper::into_paper)
            .filter(|p| query.date_in_range(p.published))
            .take(query.limit)
            .collect();

        Ok(papers)
    }

    async fn fetch(&self, id: &str) -> SourceResult<Paper> {
        tokio::time::sleep(self.courtesy_delay).await;

        let url = format!("{}/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        Self::parse_entry(&value)
            .map(HfPaper::into_paper)
            .ok_or_else(|| SourceError::decode("hf paper response missing required fields"))
    }
}
