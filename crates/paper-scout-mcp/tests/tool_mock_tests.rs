//! Mock-based tool tests using wiremock.
//!
//! These tests verify tool behavior end to end by mocking the upstream
//! paper sources.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paper_scout_mcp::config::Config;
use paper_scout_mcp::pipeline::SearchPipeline;
use paper_scout_mcp::tools::{
    ExportReferencesTool, FetchPaperTool, McpTool, SearchPapersTool, ToolContext,
};

/// Create a test context backed by a mock server.
fn setup_test_context(mock_server: &MockServer) -> ToolContext {
    let config = Config::for_testing(&mock_server.uri());
    let pipeline = SearchPipeline::new(config).unwrap();
    ToolContext::new(Arc::new(pipeline))
}

fn arxiv_feed_with(id: &str, title: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <feed xmlns=\"http://www.w3.org/2005/Atom\">\n\
         <entry>\n\
         <id>http://arxiv.org/abs/{id}</id>\n\
         <title>{title}</title>\n\
         <summary>A study of {title}.</summary>\n\
         <published>2025-03-04T00:00:00Z</published>\n\
         <author><name>Alice Prior</name></author>\n\
         </entry>\n\
         </feed>"
    )
}

async fn mount_empty_hf_and_s2(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/hf/api/papers/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s2/graph/v1/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(server)
        .await;
}

// =============================================================================
// SearchPapersTool
// =============================================================================

#[tokio::test]
async fn test_search_papers_markdown_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;
    mount_empty_hf_and_s2(&mock_server).await;

    let ctx = setup_test_context(&mock_server);
    let tool = SearchPapersTool;

    let result = tool.execute(&ctx, json!({"query": "quantum gravity"})).await.unwrap();

    assert!(result.contains("# Search Results (1 papers)"));
    assert!(result.contains("## 1. Quantum Gravity Overview"));
    assert!(result.contains("**Identity**: `arxiv:2503.01469`"));
    assert!(result.contains("arxiv: 1"));
    // No embeddings key configured, so the lexical note is present
    assert!(result.contains("lexical"));
}

#[tokio::test]
async fn test_search_papers_json_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;
    mount_empty_hf_and_s2(&mock_server).await;

    let ctx = setup_test_context(&mock_server);
    let tool = SearchPapersTool;

    let result = tool
        .execute(&ctx, json!({"query": "quantum gravity", "responseFormat": "json"}))
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed["papers"][0]["id"], "arxiv:2503.01469");
    assert_eq!(parsed["papers"][0]["title"], "Quantum Gravity Overview");
    assert_eq!(parsed["degraded"], true);
    assert_eq!(parsed["sources"]["arxiv"]["status"], "ok");
}

#[tokio::test]
async fn test_search_papers_rejects_blank_query() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);
    let tool = SearchPapersTool;

    let err = tool.execute(&ctx, json!({"query": "   "})).await.unwrap_err();
    assert!(err.to_user_message().contains("query"));
}

#[tokio::test]
async fn test_search_papers_rejects_excessive_limit() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);
    let tool = SearchPapersTool;

    let err = tool.execute(&ctx, json!({"query": "q", "limit": 500})).await.unwrap_err();
    assert!(err.to_user_message().contains("limit"));
}

// =============================================================================
// FetchPaperTool
// =============================================================================

#[tokio::test]
async fn test_fetch_paper_markdown_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("id_list", "2503.01469"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = FetchPaperTool;

    let result = tool.execute(&ctx, json!({"identity": "arxiv:2503.01469"})).await.unwrap();

    assert!(result.contains("# Quantum Gravity Overview"));
    assert!(result.contains("**Identity**: `arxiv:2503.01469`"));
    assert!(result.contains("Alice Prior"));
}

#[tokio::test]
async fn test_fetch_paper_json_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = FetchPaperTool;

    let result = tool
        .execute(&ctx, json!({"identity": "arxiv:2503.01469", "responseFormat": "json"}))
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed["id"], "arxiv:2503.01469");
    assert_eq!(parsed["title"], "Quantum Gravity Overview");
}

#[tokio::test]
async fn test_fetch_paper_rejects_malformed_identity() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);
    let tool = FetchPaperTool;

    let err = tool.execute(&ctx, json!({"identity": "not-an-identity"})).await.unwrap_err();
    assert!(err.to_user_message().contains("identity"));
}

#[tokio::test]
async fn test_fetch_paper_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s2/graph/v1/paper/missing123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = FetchPaperTool;

    let err = tool.execute(&ctx, json!({"identity": "s2:missing123"})).await.unwrap_err();
    assert!(err.to_user_message().contains("Not found"));
}

// =============================================================================
// ExportReferencesTool
// =============================================================================

#[tokio::test]
async fn test_export_references_bibtex() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("id_list", "2503.01469"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("id_list", "2504.99999"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2504.99999v1", "Sparse Attention Kernels")),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let result = tool
        .execute(&ctx, json!({"identities": ["arxiv:2503.01469", "arxiv:2504.99999"]}))
        .await
        .unwrap();

    assert_eq!(result.matches("@article{").count(), 2);
    assert!(result.contains("Quantum Gravity Overview"));
    assert!(result.contains("Sparse Attention Kernels"));
    assert!(result.contains("author = {Alice Prior}"));
}

#[tokio::test]
async fn test_export_references_ris() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let result = tool
        .execute(&ctx, json!({"identities": ["arxiv:2503.01469"], "format": "ris"}))
        .await
        .unwrap();

    assert!(result.starts_with("TY  - JOUR"));
    assert!(result.contains("TI  - Quantum Gravity Overview"));
    assert!(result.contains("ID  - arxiv:2503.01469"));
}

#[tokio::test]
async fn test_export_references_csv_without_abstract() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let result = tool
        .execute(
            &ctx,
            json!({
                "identities": ["arxiv:2503.01469"],
                "format": "csv",
                "includeAbstract": false
            }),
        )
        .await
        .unwrap();

    let header = result.lines().next().unwrap();
    assert_eq!(header, "id,title,authors,published,arxiv_id,doi,url");
    assert!(result.contains("arxiv:2503.01469,Quantum Gravity Overview"));
}

#[tokio::test]
async fn test_export_references_skips_unresolvable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(arxiv_feed_with("2503.01469v1", "Quantum Gravity Overview")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s2/graph/v1/paper/missing123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let result = tool
        .execute(&ctx, json!({"identities": ["arxiv:2503.01469", "s2:missing123"]}))
        .await
        .unwrap();

    assert_eq!(result.matches("@article{").count(), 1);
    assert!(result.contains("Quantum Gravity Overview"));
}

#[tokio::test]
async fn test_export_references_fails_when_nothing_resolves() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s2/graph/v1/paper/missing123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let err = tool
        .execute(&ctx, json!({"identities": ["s2:missing123"]}))
        .await
        .unwrap_err();

    assert!(err.to_user_message().contains("Not found"));
}

#[tokio::test]
async fn test_export_references_rejects_empty_list() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);
    let tool = ExportReferencesTool;

    let err = tool.execute(&ctx, json!({"identities": []})).await.unwrap_err();
    assert!(err.to_user_message().contains("identities"));
}
