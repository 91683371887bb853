//! Property-based tests for tool input models and paper identities.

use proptest::prelude::*;

use paper_scout_mcp::models::{
    ExportReferencesInput, FetchPaperInput, PaperId, ResponseFormat, SearchPapersInput,
    SourceKind,
};

/// Generate arbitrary SearchPapersInput.
fn arb_search_input() -> impl Strategy<Value = SearchPapersInput> {
    (
        "[A-Za-z0-9 ]{1,50}",                                  // query
        0usize..200,                                           // limit
        proptest::option::of(proptest::collection::vec(
            prop_oneof![Just("arxiv".to_string()), Just("hf".to_string()), Just("s2".to_string())],
            0..3,
        )),                                                    // sources
        proptest::option::of("202[0-5]-0[1-9]-0[1-9]"),        // date_from
        proptest::option::of("202[0-5]-0[1-9]-0[1-9]"),        // date_to
    )
        .prop_map(|(query, limit, sources, date_from, date_to)| SearchPapersInput {
            query,
            limit,
            sources,
            date_from,
            date_to,
            response_format: ResponseFormat::default(),
        })
}

fn arb_source_kind() -> impl Strategy<Value = SourceKind> {
    prop_oneof![Just(SourceKind::Arxiv), Just(SourceKind::Hf), Just(SourceKind::S2)]
}

proptest! {
    /// SearchPapersInput roundtrip serialization.
    #[test]
    fn search_input_roundtrip(input in arb_search_input()) {
        let json = serde_json::to_value(&input).expect("serialize");
        let decoded: SearchPapersInput = serde_json::from_value(json).expect("deserialize");

        prop_assert_eq!(&input.query, &decoded.query);
        prop_assert_eq!(input.limit, decoded.limit);
        prop_assert_eq!(&input.sources, &decoded.sources);
        prop_assert_eq!(&input.date_from, &decoded.date_from);
        prop_assert_eq!(&input.date_to, &decoded.date_to);
    }

    /// Deserialization accepts any numeric limit; range checks live in
    /// the pipeline's validation step.
    #[test]
    fn search_input_accepts_any_limit(limit in any::<u32>()) {
        let json = serde_json::json!({
            "query": "test query",
            "limit": limit,
        });

        let input = serde_json::from_value::<SearchPapersInput>(json).unwrap();
        prop_assert_eq!(input.limit, limit as usize);
    }

    /// SearchPapersInput handles both response formats.
    #[test]
    fn search_input_response_format(use_json in any::<bool>()) {
        let format_str = if use_json { "json" } else { "markdown" };
        let json = serde_json::json!({
            "query": "test",
            "responseFormat": format_str,
        });

        let input = serde_json::from_value::<SearchPapersInput>(json).unwrap();
        if use_json {
            prop_assert!(input.response_format.is_json());
        } else {
            prop_assert!(input.response_format.is_markdown());
        }
    }

    /// PaperId display/parse roundtrip for well-formed identities.
    #[test]
    fn paper_id_roundtrip(source in arb_source_kind(), id in "[A-Za-z0-9./_-]{1,32}") {
        let identity = PaperId::new(source, id);
        let parsed: PaperId = identity.to_string().parse().expect("parse");
        prop_assert_eq!(parsed, identity);
    }

    /// Identity strings without a known source prefix never parse.
    #[test]
    fn paper_id_rejects_unknown_source(source in "[a-z]{4,10}", id in "[a-z0-9]{1,10}") {
        prop_assume!(source != "arxiv");
        let result = format!("{source}:{id}").parse::<PaperId>();
        prop_assert!(result.is_err());
    }
}

#[test]
fn paper_id_keeps_colons_in_id() {
    let parsed: PaperId = "s2:DOI:10.1000/xyz".parse().unwrap();
    assert_eq!(parsed.source, SourceKind::S2);
    assert_eq!(parsed.id, "DOI:10.1000/xyz");
}

#[test]
fn paper_id_rejects_empty_id() {
    assert!("arxiv:".parse::<PaperId>().is_err());
    assert!("arxiv".parse::<PaperId>().is_err());
}

#[test]
fn fetch_input_accepts_identity() {
    let json = serde_json::json!({
        "identity": "arxiv:2503.01469"
    });

    let input: FetchPaperInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.identity, "arxiv:2503.01469");
    assert!(input.response_format.is_markdown());
}

#[test]
fn fetch_input_rejects_missing_identity() {
    let json = serde_json::json!({
        "responseFormat": "json"
    });

    let result = serde_json::from_value::<FetchPaperInput>(json);
    assert!(result.is_err());
}

#[test]
fn export_input_accepts_identities() {
    let json = serde_json::json!({
        "identities": ["arxiv:2503.01469", "s2:abc123"],
        "format": "ris"
    });

    let input: ExportReferencesInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.identities.len(), 2);
    assert!(input.include_abstract);
}

#[test]
fn export_input_rejects_missing_identities() {
    let json = serde_json::json!({
        "format": "bibtex"
    });

    let result = serde_json::from_value::<ExportReferencesInput>(json);
    assert!(result.is_err());
}

#[test]
fn search_input_defaults() {
    let json = serde_json::json!({
        "query": "state space models"
    });

    let input: SearchPapersInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.query, "state space models");
    assert_eq!(input.limit, 10);
    assert!(input.sources.is_none());
    assert!(input.date_from.is_none());
    assert!(input.date_to.is_none());
    assert!(input.response_format.is_markdown());
}
