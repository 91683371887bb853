//! Response and embedding caches.
//!
//! Both caches are keyed by content hashes so equivalent requests
//! collapse onto one entry. Loads go through `try_get_with`, which
//! also gives single-flight behavior: concurrent misses on one key
//! share a single provider call, and a failed or abandoned load leaves
//! nothing behind.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use md5::{Digest, Md5};
use moka::future::Cache;
use sha2::Sha256;

use crate::config::Config;
use crate::error::SourceError;
use crate::models::Paper;

/// Two-tier cache: short-lived provider responses, long-lived
/// embedding vectors.
#[derive(Debug)]
pub struct SearchCache {
    responses: Cache<String, Arc<Vec<Paper>>>,
    embeddings: Cache<String, Arc<Vec<f32>>>,
    response_ttl: Duration,
    embedding_ttl: Duration,
}

fn build_cache<V>(max_capacity: u64, ttl: Duration) -> Cache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    let mut builder = Cache::builder().max_capacity(max_capacity);
    if !ttl.is_zero() {
        builder = builder.time_to_live(ttl);
    }
    builder.build()
}

impl SearchCache {
    /// Build both tiers from the configured TTLs and capacities. A
    /// zero TTL disables that tier entirely.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            responses: build_cache(config.response_cache_max, config.response_cache_ttl),
            embeddings: build_cache(config.embedding_cache_max, config.embedding_cache_ttl),
            response_ttl: config.response_cache_ttl,
            embedding_ttl: config.embedding_cache_ttl,
        }
    }

    /// Return the cached paper list for `key`, or run `init` to load
    /// it. Concurrent callers with the same key share one load.
    ///
    /// # Errors
    ///
    /// Returns the load error; when several callers share one failed
    /// load they all see the same `Arc`'d error. Failures are not
    /// cached.
    pub async fn papers_or_fetch<F>(
        &self,
        key: String,
        init: F,
    ) -> Result<Arc<Vec<Paper>>, Arc<SourceError>>
    where
        F: Future<Output = Result<Vec<Paper>, SourceError>>,
    {
        if self.response_ttl.is_zero() {
            return init.await.map(Arc::new).map_err(Arc::new);
        }
        self.responses
            .try_get_with(key, async move { init.await.map(Arc::new) })
            .await
    }

    /// Look up a single embedding vector.
    pub async fn embedding(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        if self.embedding_ttl.is_zero() {
            return None;
        }
        self.embeddings.get(key).await
    }

    /// Store one embedding vector.
    pub async fn store_embedding(&self, key: String, vector: Vec<f32>) {
        if self.embedding_ttl.is_zero() {
            return;
        }
        self.embeddings.insert(key, Arc::new(vector)).await;
    }

    /// Return the cached embedding for `key`, or run `init` to compute
    /// it. Used for query vectors, where concurrent identical searches
    /// should share one embeddings call.
    ///
    /// # Errors
    ///
    /// Returns the load error; failures are not cached.
    pub async fn embedding_or_compute<F>(
        &self,
        key: String,
        init: F,
    ) -> Result<Arc<Vec<f32>>, Arc<SourceError>>
    where
        F: Future<Output = Result<Vec<f32>, SourceError>>,
    {
        if self.embedding_ttl.is_zero() {
            return init.await.map(Arc::new).map_err(Arc::new);
        }
        self.embeddings
            .try_get_with(key, async move { init.await.map(Arc::new) })
            .await
    }
}

/// Signature for a provider response: md5 over the request parts
/// (source, operation, normalized query, constraints).
#[must_use]
pub fn response_signature(parts: &[&str]) -> String {
    let joined = parts.join("|");
    format!("{:x}", Md5::digest(joined.as_bytes()))
}

/// Signature for an embedding vector: sha256 over the model name and
/// the normalized text, so a model change never reuses stale vectors.
#[must_use]
pub fn embedding_signature(model: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(b"\n");
    hasher.update(normalize_for_key(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lowercase and collapse whitespace so trivially different texts hash
/// to the same key.
fn normalize_for_key(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
