//! Lexical fallback scoring.

use std::collections::BTreeSet;

use crate::models::Paper;

/// Fraction of distinct query terms found in the candidate's title and
/// abstract. Crude, but it keeps results ordered when the embedding
/// service is unreachable.
pub fn lexical_score(query: &str, paper: &Paper) -> f64 {
    let terms = tokens(query);
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = tokens(&paper.ranking_text());
    let hits = terms.iter().filter(|t| haystack.contains(*t)).count();
    hits as f64 / terms.len() as f64
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperId, SourceKind};

    fn paper(title: &str, abstract_text: Option<&str>) -> Paper {
        let mut p = Paper::new(
            PaperId::new(SourceKind::Arxiv, "2503.01469".to_string()),
            title.to_string(),
        );
        p.abstract_text = abstract_text.map(String::from);
        p
    }

    #[test]
    fn test_full_match() {
        let p = paper("Sparse Mixture of Experts", None);
        assert!((lexical_score("sparse experts", &p) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_match_counts_distinct_terms() {
        let p = paper("Sparse Routing", None);
        // "sparse sparse experts" has two distinct terms, one matches
        assert!((lexical_score("sparse sparse experts", &p) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_abstract_terms_count() {
        let p = paper("A Title", Some("gradient descent at scale"));
        assert!((lexical_score("gradient scale", &p) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let p = paper("Convex Optimization", None);
        assert!(lexical_score("protein folding", &p).abs() < 1e-9);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let p = paper("Anything", None);
        assert!(lexical_score("  ", &p).abs() < 1e-9);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let p = paper("Mixture-of-Experts", None);
        assert!((lexical_score("MIXTURE experts", &p) - 1.0).abs() < 1e-9);
    }
}
