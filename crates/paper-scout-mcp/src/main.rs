//! Paper Scout MCP Server - Entry Point
//!
//! Speaks MCP over stdio. All logging goes to stderr so stdout stays
//! a clean JSON-RPC channel.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paper_scout_mcp::{config::Config, pipeline::SearchPipeline, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "paper-scout-mcp")]
#[command(about = "MCP server for multi-source literature discovery")]
#[command(version)]
struct Cli {
    /// Semantic Scholar API key (optional, enables higher rate limits)
    #[arg(long, env = "S2_API_KEY")]
    s2_api_key: Option<String>,

    /// Embeddings API key (optional; lexical ranking is used without it)
    #[arg(long, env = "EMBEDDINGS_API_KEY")]
    embeddings_api_key: Option<String>,

    /// Embeddings endpoint (OpenAI-compatible /v1/embeddings)
    #[arg(long, env = "EMBEDDINGS_API_URL")]
    embeddings_url: Option<String>,

    /// Embedding model name
    #[arg(long, env = "EMBEDDINGS_MODEL")]
    embedding_model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout carries JSON-RPC frames, so logs must go to stderr
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Paper Scout MCP server"
    );

    let embeddings_api_key =
        cli.embeddings_api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let mut config = Config::new(cli.s2_api_key, embeddings_api_key);
    if let Some(url) = cli.embeddings_url {
        config.embeddings_api_url = url;
    }
    if let Some(model) = cli.embedding_model {
        config.embedding_model = model;
    }

    if !config.has_embedding_credentials() {
        tracing::warn!("No embeddings API key; results will be ranked lexically");
    }

    let pipeline = Arc::new(SearchPipeline::new(config)?);
    let server = McpServer::new(pipeline);

    server.run_stdio().await
}
