//! Configuration for the paper-scout MCP server.

use std::time::Duration;

/// Default endpoints and tuning constants.
pub mod defaults {
    use std::time::Duration;

    /// arXiv export API endpoint (Atom XML).
    pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";

    /// Hugging Face papers API base (search lives under `/search`).
    pub const HF_PAPERS_API: &str = "https://huggingface.co/api/papers";

    /// Semantic Scholar Graph API endpoint.
    pub const S2_GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// OpenAI-compatible embeddings endpoint.
    pub const EMBEDDINGS_API: &str = "https://api.openai.com/v1/embeddings";

    /// Embedding model requested from the embeddings endpoint.
    pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";

    /// Request timeout for a single HTTP call.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Budget for one source to answer a search before it is recorded
    /// as unavailable (covers retries).
    pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(20);

    /// Courtesy delay before each uncached provider call (arXiv asks
    /// clients to stay well under 1 req/s per endpoint).
    pub const COURTESY_DELAY: Duration = Duration::from_millis(200);

    /// TTL for cached provider responses (5 minutes).
    pub const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cached provider responses.
    pub const RESPONSE_CACHE_MAX: u64 = 1000;

    /// TTL for cached embedding vectors (24 hours; paper text for a
    /// given identity never changes).
    pub const EMBEDDING_CACHE_TTL: Duration = Duration::from_secs(86_400);

    /// Maximum cached embedding vectors.
    pub const EMBEDDING_CACHE_MAX: u64 = 10_000;

    /// Hard ceiling on requested results per search.
    pub const MAX_RESULTS: usize = 50;

    /// Result count when the caller does not specify a limit.
    pub const DEFAULT_RESULTS: usize = 10;

    /// Title-times-author similarity above which two records without a
    /// shared canonical id are merged.
    pub const DEDUP_THRESHOLD: f64 = 0.60;

    /// Papers published within this many days receive a recency boost.
    pub const RECENCY_WINDOW_DAYS: i64 = 30;

    /// Maximum additive recency boost.
    pub const RECENCY_BOOST_MAX: f64 = 0.05;

    /// Maximum connections kept alive per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional, raises rate limits).
    pub s2_api_key: Option<String>,

    /// API key for the embeddings endpoint. Without one the ranker
    /// degrades to lexical ordering instead of failing.
    pub embeddings_api_key: Option<String>,

    /// arXiv export API URL (overridable for mock servers).
    pub arxiv_api_url: String,

    /// Hugging Face papers API base URL (overridable for mock servers).
    pub hf_api_url: String,

    /// Semantic Scholar Graph API URL (overridable for mock servers).
    pub s2_api_url: String,

    /// Embeddings endpoint URL (overridable for mock servers).
    pub embeddings_api_url: String,

    /// Embedding model name.
    pub embedding_model: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Per-source search budget.
    pub source_timeout: Duration,

    /// Courtesy delay before uncached provider calls.
    pub courtesy_delay: Duration,

    /// Provider response cache TTL.
    pub response_cache_ttl: Duration,

    /// Provider response cache capacity.
    pub response_cache_max: u64,

    /// Embedding cache TTL.
    pub embedding_cache_ttl: Duration,

    /// Embedding cache capacity.
    pub embedding_cache_max: u64,

    /// Hard ceiling on requested results per search.
    pub max_results: usize,

    /// Dedup similarity threshold.
    pub dedup_threshold: f64,

    /// Recency boost window in days.
    pub recency_window_days: i64,

    /// Maximum additive recency boost.
    pub recency_boost_max: f64,
}

impl Config {
    /// Create a new configuration with optional provider credentials.
    #[must_use]
    pub fn new(s2_api_key: Option<String>, embeddings_api_key: Option<String>) -> Self {
        Self {
            s2_api_key,
            embeddings_api_key,
            arxiv_api_url: defaults::ARXIV_API.to_string(),
            hf_api_url: defaults::HF_PAPERS_API.to_string(),
            s2_api_url: defaults::S2_GRAPH_API.to_string(),
            embeddings_api_url: defaults::EMBEDDINGS_API.to_string(),
            embedding_model: defaults::EMBEDDING_MODEL.to_string(),
            request_timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            source_timeout: defaults::SOURCE_TIMEOUT,
            courtesy_delay: defaults::COURTESY_DELAY,
            response_cache_ttl: defaults::RESPONSE_CACHE_TTL,
            response_cache_max: defaults::RESPONSE_CACHE_MAX,
            embedding_cache_ttl: defaults::EMBEDDING_CACHE_TTL,
            embedding_cache_max: defaults::EMBEDDING_CACHE_MAX,
            max_results: defaults::MAX_RESULTS,
            dedup_threshold: defaults::DEDUP_THRESHOLD,
            recency_window_days: defaults::RECENCY_WINDOW_DAYS,
            recency_boost_max: defaults::RECENCY_BOOST_MAX,
        }
    }

    /// Create a test configuration pointing every outbound call at a
    /// mock server, with distinct path prefixes per provider.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            s2_api_key: None,
            embeddings_api_key: None,
            arxiv_api_url: format!("{base_url}/arxiv/api/query"),
            hf_api_url: format!("{base_url}/hf/api/papers"),
            s2_api_url: format!("{base_url}/s2/graph/v1"),
            embeddings_api_url: format!("{base_url}/embed/v1/embeddings"),
            embedding_model: defaults::EMBEDDING_MODEL.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            source_timeout: Duration::from_secs(5),
            courtesy_delay: Duration::from_millis(0), // No delay in tests
            response_cache_ttl: Duration::from_secs(0), // No caching in tests
            response_cache_max: 0,
            embedding_cache_ttl: Duration::from_secs(0),
            embedding_cache_max: 0,
            max_results: defaults::MAX_RESULTS,
            dedup_threshold: defaults::DEDUP_THRESHOLD,
            recency_window_days: defaults::RECENCY_WINDOW_DAYS,
            recency_boost_max: defaults::RECENCY_BOOST_MAX,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Recognized: `S2_API_KEY`, `EMBEDDINGS_API_KEY` (falling back to
    /// `OPENAI_API_KEY`), `EMBEDDINGS_API_URL`, `EMBEDDINGS_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let s2_api_key = std::env::var("S2_API_KEY").ok();
        let embeddings_api_key =
            std::env::var("EMBEDDINGS_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")).ok();

        let mut config = Self::new(s2_api_key, embeddings_api_key);

        if let Ok(url) = std::env::var("EMBEDDINGS_API_URL") {
            config.embeddings_api_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDINGS_MODEL") {
            config.embedding_model = model;
        }

        Ok(config)
    }

    /// Check if embedding credentials are configured.
    #[must_use]
    pub const fn has_embedding_credentials(&self) -> bool {
        self.embeddings_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}
