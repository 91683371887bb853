//! Paper source adapters.
//!
//! One adapter per provider behind the [`PaperSource`] trait. Adapters
//! translate a validated [`SearchQuery`] into provider request shapes,
//! normalize provider records into [`Paper`], and surface every
//! transport or decoding failure as a [`SourceError`] so the pipeline
//! can tell "nothing matched" (empty vec) from "could not ask".

mod arxiv;
mod hf_papers;
mod semantic_scholar;

pub use arxiv::ArxivSource;
pub use hf_papers::HfPapersSource;
pub use semantic_scholar::SemanticScholarSource;

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, defaults};
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, SearchQuery, SourceKind};

/// A provider of paper metadata.
#[async_trait::async_trait]
pub trait PaperSource: Send + Sync {
    /// Which source this adapter talks to.
    fn kind(&self) -> SourceKind;

    /// Search the provider. An empty vec means the provider answered
    /// and nothing matched; errors mean the provider could not be
    /// asked.
    async fn search(&self, query: &SearchQuery) -> SourceResult<Vec<Paper>>;

    /// Resolve a source-local id to a single paper.
    async fn fetch(&self, id: &str) -> SourceResult<Paper>;
}

/// Build the shared HTTP client: connection pooling, gzip, and retry
/// middleware with exponential backoff. All adapters and the embedder
/// clone this one client.
///
/// # Errors
///
/// Returns error if HTTP client initialization fails.
pub fn build_http_client(config: &Config) -> anyhow::Result<ClientWithMiddleware> {
    let client = Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(defaults::MAX_KEEPALIVE)
        .pool_idle_timeout(defaults::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
        .build_with_max_retries(3);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Map provider response status codes onto [`SourceError`].
pub(crate) async fn handle_response(
    response: reqwest::Response,
) -> SourceResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(SourceError::rate_limited(retry_after))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(SourceError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(SourceError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(SourceError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(SourceError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Collapse consecutive whitespace into single spaces. Provider titles
/// and abstracts often carry feed line breaks.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a provider date that may be a bare date or a full RFC 3339
/// timestamp.
pub(crate) fn parse_provider_date(raw: &str) -> Option<chrono::NaiveDate> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}
