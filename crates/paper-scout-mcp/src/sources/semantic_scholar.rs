//! Semantic Scholar source adapter.
//!
//! Uses the Graph API relevance search. An API key is optional; when
//! configured it is sent per request as `x-api-key` so the shared
//! client stays provider-neutral.

use std::time::Duration;

use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::Deserialize;

use super::{PaperSource, handle_response, normalize_whitespace, parse_provider_date};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, PaperId, SearchQuery, SourceKind};

const SEARCH_FIELDS: &str = "title,abstract,authors,externalIds,url,openAccessPdf,publicationDate";

/// Semantic Scholar Graph API adapter.
pub struct SemanticScholarSource {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    courtesy_delay: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    external_ids: Option<S2ExternalIds>,
    url: Option<String>,
    open_access_pdf: Option<S2OpenAccessPdf>,
    publication_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2OpenAccessPdf {
    url: Option<String>,
}

impl S2Paper {
    /// Records without an id or title are unusable and dropped.
    fn into_paper(self) -> Option<Paper> {
        let id = self.paper_id?;
        let title = self
            .title
            .as_deref()
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())?;

        let url = self
            .url
            .unwrap_or_else(|| format!("https://www.semanticscholar.org/paper/{id}"));
        let external_ids = self.external_ids.unwrap_or_default();

        let mut paper = Paper::new(PaperId::new(SourceKind::S2, id), title);
        paper.authors = self.authors.into_iter().filter_map(|a| a.name).collect();
        paper.abstract_text = self
            .abstract_text
            .as_deref()
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty());
        paper.published = self.publication_date.as_deref().and_then(parse_provider_date);
        paper.url = Some(url);
        paper.pdf_url = self.open_access_pdf.and_then(|p| p.url);
        paper.arxiv_id = external_ids.arxiv;
        paper.doi = external_ids.doi;
        Some(paper)
    }
}

impl SemanticScholarSource {
    /// Create an adapter using the shared HTTP client.
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &Config) -> Self {
        Self {
            client,
            base_url: config.s2_api_url.clone(),
            api_key: config.s2_api_key.clone(),
            courtesy_delay: config.courtesy_delay,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        request
    }

    /// Graph API date filter, `YYYY-MM-DD:YYYY-MM-DD` with open ends.
    fn date_filter(query: &SearchQuery) -> Option<String> {
        if query.date_from.is_none() && query.date_to.is_none() {
            return None;
        }
        let from = query.date_from.map(|d| d.to_string()).unwrap_or_default();
        let to = query.date_to.map(|d| d.to_string()).unwrap_or_default();
        Some(format!("{from}:{to}"))
    }
}

#[async_trait::async_trait]
impl PaperSource for SemanticScholarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::S2
    }

    async fn search(&self, query: &SearchQuery) -> SourceResult<Vec<Paper>> {
        tokio::time::sleep(self.courtesy_delay).await;

        let url = format!("{}/paper/search", self.base_url);
        let mut params = vec![
            ("query".to_string(), query.text.clone()),
            ("limit".to_string(), query.limit.to_string()),
            ("fields".to_string(), SEARCH_FIELDS.to_string()),
        ];
        if let Some(range) = Self::date_filter(query) {
            params.push(("publicationDateOrYear".to_string(), range));
        }

        tracing::debug!(query = %query.text, limit = query.limit, "s2 search");

        let response = self.get(&url).query(&params).send().await?;
        let response = handle_response(response).await?;
        let body: S2SearchResponse = response.json().await?;

        Ok(body.data.into_iter().filter_map(S2Paper::into_paper).collect())
    }

    async fn fetch(&self, id: &str) -> SourceResult<Paper> {
        tokio::time::sleep(self.courtesy_delay).await;

        let url = format!("{}/paper/{id}", self.base_url);
        let response = self
            .get(&url)
            .query(&[("fields", SEARCH_FIELDS)])
            .send()
            .await?;
        let response = handle_response(response).await?;
        let record: S2Paper = response.json().await?;

        record
            .into_paper()
            .ok_or_else(|| SourceError::decode("s2 paper response missing required fields"))
    }
}
