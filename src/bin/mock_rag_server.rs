use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use clap::Parser;
use rs_rag_cli::app::{create_fixture_app, init_tracing};
use rs_rag_cli::config::ServerConfig;
use rs_rag_cli::handlers::FixtureState;
use rs_rag_cli::models::Document;
use tracing::info;

/// Local stand-in for a RAG server, for exercising rag-cli by hand.
///
/// Binds to HOST:PORT (default 127.0.0.1:8001).
#[derive(Debug, Parser)]
#[command(name = "mock-rag-server")]
struct Args {
    /// Fixed answer for every query; echoes the query when omitted
    #[arg(long)]
    answer: Option<String>,

    /// JSON file with the documents to return
    #[arg(long, value_name = "FILE")]
    documents: Option<PathBuf>,

    /// Artificial latency before answering, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Fail every query with this HTTP status
    #[arg(long)]
    fail_status: Option<u16>,

    /// Body returned together with --fail-status
    #[arg(long, default_value = "internal error")]
    fail_body: String,
}

fn build_state(args: &Args) -> anyhow::Result<FixtureState> {
    let mut state = FixtureState::default().with_delay(Duration::from_millis(args.delay_ms));

    if let Some(answer) = &args.answer {
        state = state.with_answer(answer.clone());
    }

    if let Some(path) = &args.documents {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let documents: Vec<Document> =
            serde_json::from_str(&raw).context("documents file must be a JSON list of documents")?;
        state = state.with_documents(documents);
    }

    if let Some(code) = args.fail_status {
        let status = StatusCode::from_u16(code).context("--fail-status must be a valid HTTP status")?;
        state = state.with_failure(status, args.fail_body.clone());
    }

    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("rs_rag_cli=info,mock_rag_server=info,tower_http=debug");

    let args = Args::parse();
    let config = ServerConfig::from_env()?;
    let state = build_state(&args)?;
    info!("Fixture loaded with {} documents", state.documents.len());

    let app = create_fixture_app(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&config.bind_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address()))?;

    info!("Server running on {}", config.server_url());
    info!("Health check: GET /health");
    info!("Query endpoint: POST /query");

    axum::serve(listener, app).await?;
    info!("Server shutdown gracefully");
    Ok(())
}
