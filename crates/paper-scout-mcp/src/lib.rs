//! Paper Scout MCP Server
//!
//! A Model Context Protocol (MCP) server for literature discovery.
//! Enables LLM agents to search arXiv, Hugging Face papers, and
//! Semantic Scholar through one interface, with cross-source
//! deduplication and semantic ranking.
//!
//! # Features
//!
//! - **3 MCP Tools**: `search_papers`, `fetch_paper`, `export_references`
//! - **Async-first**: Sources are queried concurrently on Tokio
//! - **Deduplicated**: Cross-source records merge by arXiv id, DOI, or
//!   title/author similarity
//! - **Ranked**: Embedding cosine similarity with a lexical fallback
//! - **Cached**: TTL caches with request coalescing reduce upstream calls
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use paper_scout_mcp::{config::Config, pipeline::SearchPipeline, server::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = Arc::new(SearchPipeline::new(config)?);
//!     let server = McpServer::new(pipeline);
//!     server.run_stdio().await
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod server;
pub mod sources;
pub mod tools;

pub use config::Config;
pub use error::{SearchError, SourceError, ToolError};
pub use pipeline::SearchPipeline;
