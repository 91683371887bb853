//! Search pipeline: fan-out, merge, rank.
//!
//! One `SearchPipeline` owns the source adapters, the cache, and the
//! ranker, and is shared behind an `Arc` by every tool. Searches fan
//! out to the selected sources concurrently; a failing or slow source
//! is reported in the outcome instead of failing the search, and only
//! when every selected source fails does the query abort.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::cache::{SearchCache, response_signature};
use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::error::{SearchError, SearchResult, SourceError};
use crate::models::{
    Paper, PaperId, SearchOutcome, SearchPapersInput, SearchQuery, SourceKind, SourceStatus,
};
use crate::rank::{Embedder, HttpEmbedder, Ranker};
use crate::sources::{
    ArxivSource, HfPapersSource, PaperSource, SemanticScholarSource, build_http_client,
};

/// Shared search/fetch engine behind the MCP tools.
pub struct SearchPipeline {
    sources: Vec<Arc<dyn PaperSource>>,
    cache: Arc<SearchCache>,
    dedup: Deduplicator,
    ranker: Ranker,
    config: Config,
}

impl SearchPipeline {
    /// Build the pipeline: one shared HTTP client, the three source
    /// adapters, the cache, and the ranker (semantic when embedding
    /// credentials are configured, lexical otherwise).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = build_http_client(&config)?;

        let sources: Vec<Arc<dyn PaperSource>> = vec![
            Arc::new(ArxivSource::new(client.clone(), &config)),
            Arc::new(HfPapersSource::new(client.clone(), &config)),
            Arc::new(SemanticScholarSource::new(client.clone(), &config)),
        ];

        let cache = Arc::new(SearchCache::new(&config));
        let embedder = HttpEmbedder::from_config(client, &config)
            .map(|e| Arc::new(e) as Arc<dyn Embedder>);
        let ranker = Ranker::new(embedder, Arc::clone(&cache), &config);

        Ok(Self {
            sources,
            cache,
            dedup: Deduplicator::new(config.dedup_threshold),
            ranker,
            config,
        })
    }

    /// Validate a raw search input and turn it into a typed query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` naming the offending field.
    pub fn validate_search(&self, input: &SearchPapersInput) -> SearchResult<SearchQuery> {
        let text = input.query.trim();
        if text.is_empty() {
            return Err(SearchError::invalid_query("query", "cannot be empty"));
        }

        if input.limit == 0 {
            return Err(SearchError::invalid_query("limit", "must be at least 1"));
        }
        if input.limit > self.config.max_results {
            return Err(SearchError::invalid_query(
                "limit",
                format!("must be at most {}", self.config.max_results),
            ));
        }

        let sources = match &input.sources {
            None => SourceKind::ALL.to_vec(),
            Some(names) => {
                if names.is_empty() {
                    return Err(SearchError::invalid_query(
                        "sources",
                        "must name at least one source",
                    ));
                }
                let mut kinds = Vec::with_capacity(names.len());
                for name in names {
                    let kind = name
                        .parse::<SourceKind>()
                        .map_err(|e| SearchError::invalid_query("sources", e.to_string()))?;
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                kinds
            }
        };

        let date_from = parse_input_date(input.date_from.as_deref(), "dateFrom")?;
        let date_to = parse_input_date(input.date_to.as_deref(), "dateTo")?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(SearchError::invalid_query(
                    "dateFrom",
                    "must not be after dateTo",
                ));
            }
        }

        Ok(SearchQuery {
            text: text.to_string(),
            limit: input.limit,
            sources,
            date_from,
            date_to,
        })
    }

    /// Run one search: fan out, merge, rank, bound.
    ///
    /// # Errors
    ///
    /// Returns `AllSourcesFailed` when every selected source failed;
    /// individual source failures are reported in the outcome instead.
    pub async fn search(&self, query: &SearchQuery) -> SearchResult<SearchOutcome> {
        let selected: Vec<Arc<dyn PaperSource>> = self
            .sources
            .iter()
            .filter(|s| query.sources.contains(&s.kind()))
            .cloned()
            .collect();

        let kinds: Vec<SourceKind> = selected.iter().map(|s| s.kind()).collect();
        let handles: Vec<_> = selected
            .into_iter()
            .map(|source| {
                let cache = Arc::clone(&self.cache);
                let query = query.clone();
                let budget = self.config.source_timeout;
                tokio::spawn(async move {
                    match tokio::time::timeout(budget, search_one(source, cache, &query)).await {
                        Ok(Ok(papers)) => Ok(papers),
                        Ok(Err(error)) => Err(error.to_string()),
                        Err(_) => Err(format!("no answer within {budget:?}")),
                    }
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        let mut statuses: BTreeMap<SourceKind, SourceStatus> = BTreeMap::new();
        let mut candidates: Vec<Paper> = Vec::new();
        for (kind, joined) in kinds.into_iter().zip(results) {
            match joined {
                Ok(Ok(papers)) => {
                    statuses.insert(kind, SourceStatus::Ok { count: papers.len() });
                    candidates.extend(papers.iter().cloned());
                }
                Ok(Err(message)) => {
                    tracing::warn!(source = %kind, %message, "source unavailable");
                    statuses.insert(kind, SourceStatus::Unavailable { message });
                }
                Err(join_error) => {
                    tracing::error!(source = %kind, %join_error, "source task failed");
                    statuses.insert(
                        kind,
                        SourceStatus::Unavailable { message: "task failed".to_string() },
                    );
                }
            }
        }

        let any_ok = statuses.values().any(|s| matches!(s, SourceStatus::Ok { .. }));
        if !any_ok {
            return Err(SearchError::AllSourcesFailed);
        }

        let unique = self.dedup.merge(candidates);
        let ranked = self.ranker.rank(query, unique, Utc::now().date_naive()).await;

        Ok(SearchOutcome {
            papers: ranked.papers,
            sources: statuses,
            degraded: ranked.degraded,
        })
    }

    /// Resolve one identity (`"source:id"`) to its full record.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for a malformed identity, `NotFound` when the
    /// provider does not know the id, `Source` for provider failures.
    pub async fn fetch(&self, identity: &str) -> SearchResult<Paper> {
        let id: PaperId = identity
            .parse()
            .map_err(|e: crate::models::ParsePaperIdError| {
                SearchError::invalid_query("identity", e.to_string())
            })?;

        let source = self
            .sources
            .iter()
            .find(|s| s.kind() == id.source)
            .cloned()
            .ok_or_else(|| SearchError::source(id.source, "source not configured"))?;

        let key = response_signature(&[id.source.as_str(), "fetch", &id.id.to_lowercase()]);
        let local_id = id.id.clone();
        let result = self
            .cache
            .papers_or_fetch(key, async move { source.fetch(&local_id).await.map(|p| vec![p]) })
            .await;

        match result {
            Ok(papers) => papers
                .first()
                .cloned()
                .ok_or_else(|| SearchError::paper_not_found(identity)),
            Err(error) => Err(match error.as_ref() {
                SourceError::NotFound { .. } => SearchError::paper_not_found(identity),
                other => SearchError::source(id.source, other.to_string()),
            }),
        }
    }
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("sources", &self.sources.len())
            .field("max_results", &self.config.max_results)
            .finish_non_exhaustive()
    }
}

/// One source's search, deduplicated across concurrent identical
/// requests by the response cache.
async fn search_one(
    source: Arc<dyn PaperSource>,
    cache: Arc<SearchCache>,
    query: &SearchQuery,
) -> Result<Arc<Vec<Paper>>, Arc<SourceError>> {
    let key = search_signature(source.kind(), query);
    cache.papers_or_fetch(key, async { source.search(query).await }).await
}

fn search_signature(kind: SourceKind, query: &SearchQuery) -> String {
    let from = query.date_from.map(|d| d.to_string()).unwrap_or_default();
    let to = query.date_to.map(|d| d.to_string()).unwrap_or_default();
    response_signature(&[
        kind.as_str(),
        "search",
        &query.normalized_text(),
        &query.limit.to_string(),
        &from,
        &to,
    ])
}

fn parse_input_date(value: Option<&str>, field: &str) -> SearchResult<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SearchError::invalid_query(field, "expected a YYYY-MM-DD date")),
    }
}
