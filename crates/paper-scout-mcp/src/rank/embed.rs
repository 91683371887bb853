//! Embedding service client.
//!
//! Speaks the OpenAI-compatible `/embeddings` contract: one POST with
//! a batch of inputs, one vector per input keyed by `index`. The trait
//! boundary exists so ranking tests can run without a live service.

use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::sources::handle_response;

/// Turns texts into embedding vectors.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, part of every embedding cache key.
    fn model(&self) -> &str;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> SourceResult<Vec<Vec<f32>>>;
}

/// HTTP embedder for OpenAI-compatible endpoints.
pub struct HttpEmbedder {
    client: ClientWithMiddleware,
    url: Url,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    /// Build from configuration; `None` when no API key is configured
    /// or the endpoint URL does not parse, in which case the ranker
    /// runs in lexical mode instead.
    #[must_use]
    pub fn from_config(client: ClientWithMiddleware, config: &Config) -> Option<Self> {
        let api_key = config.embeddings_api_key.clone()?;
        let url = match Url::parse(&config.embeddings_api_url) {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!(%error, url = %config.embeddings_api_url, "ignoring malformed embeddings URL");
                return None;
            }
        };
        Some(Self { client, url, api_key, model: config.embedding_model.clone() })
    }
}

#[async_trait::async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> SourceResult<Vec<Vec<f32>>> {
        let body = EmbeddingRequest { model: &self.model, input: texts };

        tracing::debug!(count = texts.len(), model = %self.model, "embedding batch");

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = handle_response(response).await?;
        let mut parsed: EmbeddingResponse = response.json().await?;

        if parsed.data.len() != texts.len() {
            return Err(SourceError::decode(format!(
                "embeddings response has {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        // The contract does not promise input order
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
