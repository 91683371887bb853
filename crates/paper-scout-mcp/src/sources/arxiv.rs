//! arXiv source adapter.
//!
//! Talks to the arXiv export API, which answers Atom XML. Parsing is a
//! small state machine over `quick-xml` events; arXiv feeds are flat
//! enough that tracking the current tag plus an in-entry flag suffices.

use std::sync::LazyLock;
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::attributes::Attributes;
use quick_xml::events::{BytesStart, BytesText, Event};
use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;

use super::{PaperSource, handle_response, normalize_whitespace, parse_provider_date};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::{Paper, PaperId, SearchQuery, SourceKind, strip_arxiv_version};

/// Shape of a valid arXiv id, new style (`2503.01469v2`) or old style
/// (`hep-th/9901001`).
static ARXIV_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}\.\d{4,5}|[a-z-]+(?:\.[A-Z]{2})?/\d{7})(v\d+)?$").expect("valid regex")
});

/// Captures the id portion of an entry `<id>` URL like
/// `http://arxiv.org/abs/2503.01469v1`.
static ABS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"arxiv\.org/abs/(.+)$").expect("valid regex"));

/// arXiv export API adapter.
pub struct ArxivSource {
    client: ClientWithMiddleware,
    base_url: String,
    courtesy_delay: Duration,
}

impl ArxivSource {
    /// Create an adapter using the shared HTTP client.
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: &Config) -> Self {
        Self {
            client,
            base_url: config.arxiv_api_url.clone(),
            courtesy_delay: config.courtesy_delay,
        }
    }

    /// Build the arXiv query expression: free-text terms, plus a
    /// `submittedDate` clause when the query carries a date range.
    fn build_search_expr(query: &SearchQuery) -> String {
        let mut expr = format!("all:{}", query.text.trim());

        if query.date_from.is_some() || query.date_to.is_some() {
            let from = query
                .date_from
                .map_or_else(|| "19910101".to_string(), |d| d.format("%Y%m%d").to_string());
            let to = query
                .date_to
                .map_or_else(|| "20991231".to_string(), |d| d.format("%Y%m%d").to_string());
            expr.push_str(&format!(" AND submittedDate:[{from}0000 TO {to}2359]"));
        }

        expr
    }
}

#[async_trait::async_trait]
impl PaperSource for ArxivSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    async fn search(&self, query: &SearchQuery) -> SourceResult<Vec<Paper>> {
        tokio::time::sleep(self.courtesy_delay).await;

        let params = [
            ("search_query".to_string(), Self::build_search_expr(query)),
            ("start".to_string(), "0".to_string()),
            ("max_results".to_string(), query.limit.to_string()),
            ("sortBy".to_string(), "relevance".to_string()),
            ("sortOrder".to_string(), "descending".to_string()),
        ];

        tracing::debug!(query = %query.text, limit = query.limit, "arxiv search");

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let response = handle_response(response).await?;
        let body = response.text().await?;

        parse_atom_feed(&body)
    }

    async fn fetch(&self, id: &str) -> SourceResult<Paper> {
        // Malformed ids cannot exist on arXiv; skip the network call
        if !ARXIV_ID_RE.is_match(id) {
            return Err(SourceError::not_found(format!("arxiv:{id}")));
        }

        tokio::time::sleep(self.courtesy_delay).await;

        let params = [
            ("id_list".to_string(), id.to_string()),
            ("max_results".to_string(), "1".to_string()),
        ];

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let response = handle_response(response).await?;
        let body = response.text().await?;

        parse_atom_feed(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::not_found(format!("arxiv:{id}")))
    }
}

/// Per-entry accumulator for the Atom state machine.
#[derive(Default)]
struct EntryBuilder {
    id_url: String,
    title: String,
    summary: String,
    published: String,
    doi: String,
    authors: Vec<String>,
    pdf_url: Option<String>,
}

impl EntryBuilder {
    fn push_text(&mut self, tag: &str, text: &str, in_author: bool) {
        match tag {
            "id" => self.id_url.push_str(text),
            "title" => self.title.push_str(text),
            "summary" => self.summary.push_str(text),
            "published" => self.published.push_str(text),
            "arxiv:doi" => self.doi.push_str(text),
            "name" if in_author => self.authors.push(text.to_string()),
            _ => {}
        }
    }

    fn into_paper(self) -> Option<Paper> {
        let raw_id = ABS_URL_RE.captures(&self.id_url).map(|c| c[1].to_string())?;
        if self.title.is_empty() {
            return None;
        }

        let canonical = strip_arxiv_version(&raw_id).to_string();
        let mut paper = Paper::new(
            PaperId::new(SourceKind::Arxiv, canonical),
            normalize_whitespace(&self.title),
        );
        paper.authors = self.authors;
        if !self.summary.is_empty() {
            paper.abstract_text = Some(normalize_whitespace(&self.summary));
        }
        paper.published = parse_provider_date(&self.published);
        paper.url = Some(format!("https://arxiv.org/abs/{raw_id}"));
        paper.pdf_url = self.pdf_url;
        paper.arxiv_id = Some(raw_id);
        if !self.doi.is_empty() {
            paper.doi = Some(self.doi);
        }
        Some(paper)
    }
}

/// Extract the PDF href from a `<link>` element, if this link is the
/// PDF one (arXiv marks it with `title="pdf"`).
fn extract_pdf_href(attrs: Attributes<'_>) -> SourceResult<Option<String>> {
    let mut href = None;
    let mut is_pdf = false;

    for attr in attrs {
        let attr = attr?;
        match attr.key.as_ref() {
            b"title" if attr.value.as_ref() == b"pdf" => is_pdf = true,
            b"href" => href = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    Ok(if is_pdf { href } else { None })
}

/// Parse an arXiv Atom feed into papers. Entries without an id or
/// title are dropped.
fn parse_atom_feed(xml: &str) -> SourceResult<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut entry = EntryBuilder::default();
    let mut current_tag = String::new();
    let mut in_entry = false;
    let mut in_author = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => handle_start(
                e,
                &mut entry,
                &mut current_tag,
                &mut in_entry,
                &mut in_author,
            )?,
            Event::Empty(ref e) => {
                if in_entry && e.name().as_ref() == b"link" {
                    if let Some(href) = extract_pdf_href(e.attributes())? {
                        entry.pdf_url = Some(href);
                    }
                }
            }
            Event::Text(ref e) => {
                if in_entry {
                    let text = unescape_text(e)?;
                    entry.push_text(&current_tag, &text, in_author);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(paper) = std::mem::take(&mut entry).into_paper() {
                        papers.push(paper);
                    }
                    in_entry = false;
                    current_tag.clear();
                }
                b"author" => in_author = false,
                _ => current_tag.clear(),
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}

fn handle_start(
    e: &BytesStart<'_>,
    entry: &mut EntryBuilder,
    current_tag: &mut String,
    in_entry: &mut bool,
    in_author: &mut bool,
) -> SourceResult<()> {
    match e.name().as_ref() {
        b"entry" => {
            *in_entry = true;
            *entry = EntryBuilder::default();
        }
        b"author" if *in_entry => *in_author = true,
        b"link" if *in_entry => {
            if let Some(href) = extract_pdf_href(e.attributes())? {
                entry.pdf_url = Some(href);
            }
        }
        name if *in_entry => {
            *current_tag = String::from_utf8_lossy(name).into_owned();
        }
        _ => {}
    }
    Ok(())
}

fn unescape_text(e: &BytesText<'_>) -> SourceResult<String> {
    Ok(e.unescape()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title>ArXiv Query: search_query=all:test</title>
  <entry>
    <id>http://arxiv.org/abs/2503.01469v2</id>
    <title>Mixture of Experts,
  Revisited</title>
    <summary>We revisit sparse expert
  routing at scale.</summary>
    <published>2025-03-04T18:59:59Z</published>
    <author><name>Ada Lovelace</name></author>
    <author><name>Kurt G&#246;del</name></author>
    <arxiv:doi>10.1000/example.2503</arxiv:doi>
    <link href="http://arxiv.org/abs/2503.01469v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2503.01469v2" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/hep-th/9901001v1</id>
    <title>An Old-Style Identifier</title>
    <summary>Classic.</summary>
    <published>1999-01-04T00:00:00Z</published>
    <author><name>Emmy Noether</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = parse_atom_feed(SAMPLE_FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.id.to_string(), "arxiv:2503.01469");
        assert_eq!(first.title, "Mixture of Experts, Revisited");
        assert_eq!(first.authors, vec!["Ada Lovelace", "Kurt Gödel"]);
        assert_eq!(
            first.abstract_text.as_deref(),
            Some("We revisit sparse expert routing at scale.")
        );
        assert_eq!(first.published, NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(first.url.as_deref(), Some("https://arxiv.org/abs/2503.01469v2"));
        assert_eq!(first.pdf_url.as_deref(), Some("http://arxiv.org/pdf/2503.01469v2"));
        assert_eq!(first.arxiv_id.as_deref(), Some("2503.01469v2"));
        assert_eq!(first.doi.as_deref(), Some("10.1000/example.2503"));
        assert!(first.provenance.contains(&SourceKind::Arxiv));

        let second = &papers[1];
        assert_eq!(second.id.to_string(), "arxiv:hep-th/9901001");
        assert!(second.pdf_url.is_none());
        assert!(second.doi.is_none());
    }

    #[test]
    fn test_parse_feed_empty() {
        let xml = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
        let papers = parse_atom_feed(xml).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_parse_feed_skips_entry_without_id() {
        let xml = r#"<feed><entry><title>No id here</title></entry></feed>"#;
        let papers = parse_atom_feed(xml).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_truncated_xml() {
        let xml = r#"<feed><entry><title>Broken"#;
        assert!(parse_atom_feed(xml).is_err());
    }

    #[test]
    fn test_arxiv_id_shapes() {
        assert!(ARXIV_ID_RE.is_match("2503.01469"));
        assert!(ARXIV_ID_RE.is_match("2503.01469v2"));
        assert!(ARXIV_ID_RE.is_match("hep-th/9901001"));
        assert!(ARXIV_ID_RE.is_match("math.GT/0309136v1"));

        assert!(!ARXIV_ID_RE.is_match("notreal"));
        assert!(!ARXIV_ID_RE.is_match("10.1234/doi-style"));
        assert!(!ARXIV_ID_RE.is_match(""));
    }

    #[test]
    fn test_build_search_expr_plain() {
        let query = SearchQuery::new("sparse attention", 10);
        assert_eq!(ArxivSource::build_search_expr(&query), "all:sparse attention");
    }

    #[test]
    fn test_build_search_expr_with_range() {
        let mut query = SearchQuery::new("moe", 10);
        query.date_from = NaiveDate::from_ymd_opt(2025, 1, 1);
        query.date_to = NaiveDate::from_ymd_opt(2025, 2, 1);
        assert_eq!(
            ArxivSource::build_search_expr(&query),
            "all:moe AND submittedDate:[202501010000 TO 202502012359]"
        );
    }

    #[test]
    fn test_build_search_expr_open_range() {
        let mut query = SearchQuery::new("moe", 10);
        query.date_from = NaiveDate::from_ymd_opt(2025, 1, 1);
        let expr = ArxivSource::build_search_expr(&query);
        assert!(expr.contains("[202501010000 TO 209912312359]"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_id_without_network() {
        // Unroutable base URL: a network call would fail differently
        let config = Config::for_testing("http://127.0.0.1:1");
        let client = super::super::build_http_client(&config).unwrap();
        let source = ArxivSource::new(client, &config);

        let err = source.fetch("not an id").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
