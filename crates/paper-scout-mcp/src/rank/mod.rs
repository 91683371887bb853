//! Result ranking.
//!
//! Scores deduplicated candidates against the query with embedding
//! cosine similarity, or lexical term overlap when the embedding
//! service cannot be used. A bounded recency boost and a deterministic
//! tie-break chain make the final order stable. Truncation to the
//! requested limit happens only after every candidate is scored.

mod embed;
mod lexical;

pub use embed::{Embedder, HttpEmbedder};

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{SearchCache, embedding_signature};
use crate::config::Config;
use crate::error::SourceError;
use crate::models::{Paper, RankedPaper, SearchQuery};
use lexical::lexical_score;

/// Ranked result set plus the mode that produced it.
#[derive(Debug)]
pub struct RankOutput {
    /// Scored papers, best first, at most the requested limit.
    pub papers: Vec<RankedPaper>,
    /// True when ordering fell back to lexical overlap.
    pub degraded: bool,
}

/// Orders candidates for one query.
pub struct Ranker {
    embedder: Option<Arc<dyn Embedder>>,
    cache: Arc<SearchCache>,
    recency_window_days: i64,
    recency_boost_max: f64,
}

impl Ranker {
    /// Create a ranker. Without an embedder every search is ranked
    /// lexically and reported as degraded.
    #[must_use]
    pub fn new(
        embedder: Option<Arc<dyn Embedder>>,
        cache: Arc<SearchCache>,
        config: &Config,
    ) -> Self {
        Self {
            embedder,
            cache,
            recency_window_days: config.recency_window_days,
            recency_boost_max: config.recency_boost_max,
        }
    }

    /// Score, order, and bound the candidate set. Never fails: any
    /// embedding problem degrades to lexical ordering instead.
    pub async fn rank(
        &self,
        query: &SearchQuery,
        papers: Vec<Paper>,
        today: NaiveDate,
    ) -> RankOutput {
        if papers.is_empty() {
            return RankOutput { papers: Vec::new(), degraded: false };
        }

        let (scores, degraded) = match &self.embedder {
            Some(embedder) => {
                match self.semantic_scores(embedder.as_ref(), query, &papers).await {
                    Ok(scores) => (scores, false),
                    Err(error) => {
                        tracing::warn!(%error, "embedding unavailable, ranking lexically");
                        (lexical_scores(query, &papers), true)
                    }
                }
            }
            None => {
                tracing::warn!("no embedding credentials configured, ranking lexically");
                (lexical_scores(query, &papers), true)
            }
        };

        let mut ranked: Vec<RankedPaper> = papers
            .into_iter()
            .zip(scores)
            .map(|(paper, score)| {
                let score = score + self.recency_boost(paper.published, today);
                RankedPaper { paper, score }
            })
            .collect();

        ranked.sort_by(compare_ranked);
        ranked.truncate(query.limit);

        RankOutput { papers: ranked, degraded }
    }

    /// Cosine of each candidate against the query vector. The query
    /// vector goes through the cache with single-flight, candidates
    /// are looked up individually and the misses embedded as one batch.
    async fn semantic_scores(
        &self,
        embedder: &dyn Embedder,
        query: &SearchQuery,
        papers: &[Paper],
    ) -> Result<Vec<f64>, Arc<SourceError>> {
        let model = embedder.model().to_string();

        let query_key = embedding_signature(&model, &query.normalized_text());
        let query_texts = [query.text.clone()];
        let query_vector = self
            .cache
            .embedding_or_compute(query_key, async {
                let mut vectors = embedder.embed(&query_texts).await?;
                vectors.pop().ok_or_else(|| SourceError::decode("embeddings response was empty"))
            })
            .await?;

        let keys: Vec<String> =
            papers.iter().map(|p| embedding_signature(&model, &p.ranking_text())).collect();

        let mut vectors: Vec<Option<Arc<Vec<f32>>>> = Vec::with_capacity(papers.len());
        for (paper, key) in papers.iter().zip(&keys) {
            if let Some(vector) = &paper.embedding {
                vectors.push(Some(Arc::new(vector.clone())));
            } else {
                vectors.push(self.cache.embedding(key).await);
            }
        }

        let misses: Vec<usize> =
            vectors.iter().enumerate().filter(|(_, v)| v.is_none()).map(|(i, _)| i).collect();

        if !misses.is_empty() {
            let texts: Vec<String> = misses.iter().map(|&i| papers[i].ranking_text()).collect();
            let embedded = embedder.embed(&texts).await.map_err(Arc::new)?;
            if embedded.len() != texts.len() {
                return Err(Arc::new(SourceError::decode(format!(
                    "embedder returned {} vectors for {} candidates",
                    embedded.len(),
                    texts.len()
                ))));
            }
            for (&index, vector) in misses.iter().zip(embedded) {
                self.cache.store_embedding(keys[index].clone(), vector.clone()).await;
                vectors[index] = Some(Arc::new(vector));
            }
        }

        Ok(vectors
            .iter()
            .map(|v| v.as_deref().map_or(0.0, |vector| cosine(&query_vector, vector)))
            .collect())
    }

    /// Additive boost for papers published within the window, linear
    /// from `boost_max` (today) down to zero (window edge). Future
    /// dates clamp to `boost_max`.
    fn recency_boost(&self, published: Option<NaiveDate>, today: NaiveDate) -> f64 {
        let Some(date) = published else { return 0.0 };
        let age = (today - date).num_days().max(0);
        if age >= self.recency_window_days {
            return 0.0;
        }
        self.recency_boost_max * (1.0 - age as f64 / self.recency_window_days as f64)
    }
}

fn lexical_scores(query: &SearchQuery, papers: &[Paper]) -> Vec<f64> {
    papers.iter().map(|p| lexical_score(&query.text, p)).collect()
}

/// Deterministic order: score, then cross-source corroboration, then
/// freshness, then title.
fn compare_ranked(a: &RankedPaper, b: &RankedPaper) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.paper.provenance.len().cmp(&a.paper.provenance.len()))
        .then_with(|| compare_dates(a.paper.published, b.paper.published))
        .then_with(|| a.paper.title.cmp(&b.paper.title))
}

/// Newest first; undated records sort last.
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = (norm_a * norm_b).sqrt();
    if denom <= f64::EPSILON { 0.0 } else { dot / denom }
}
