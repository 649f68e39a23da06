//! Command-line front end: parse, call, render.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use clap::{CommandFactory, Parser};
use tracing::debug;

use crate::client::RagClient;
use crate::config::ClientConfig;
use crate::models::Message;
use crate::render::{render_human, render_json};

/// Ask a question to a RAG server and print the answer with its sources.
#[derive(Debug, Parser)]
#[command(
    name = "rag-cli",
    version,
    after_help = "Environment:\n  RAG_BASE_URL  Base URL of the RAG server (default http://127.0.0.1:8001)"
)]
pub struct Cli {
    /// Print raw JSON (question, answer, documents, latency_ms) for agents and scripts
    #[arg(long)]
    pub json: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub timeout: u64,

    /// Base URL of the RAG server; overrides RAG_BASE_URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// JSON file with prior conversation turns: [{"role": ..., "content": ...}]
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Check the server's /health endpoint instead of asking a question
    #[arg(long)]
    pub health: bool,

    /// The question; words are joined with single spaces
    #[arg(value_name = "QUESTION")]
    pub question: Vec<String>,
}

impl Cli {
    pub fn question(&self) -> Option<String> {
        if self.question.is_empty() {
            None
        } else {
            Some(self.question.join(" "))
        }
    }

    /// Whether there is enough input to do anything
    pub fn has_work(&self) -> bool {
        self.health || self.question().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub fn load_history(path: &Path) -> anyhow::Result<Vec<Message>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;
    let history: Vec<Message> = serde_json::from_str(&raw)
        .with_context(|| format!("history file {} is not a JSON message list", path.display()))?;
    debug!("Loaded {} history messages from {}", history.len(), path.display());
    Ok(history)
}

/// Executes one invocation, writing the rendered result to `out`
pub async fn run<W: Write>(cli: &Cli, config: ClientConfig, out: &mut W) -> anyhow::Result<()> {
    let config = match &cli.base_url {
        Some(url) => config.with_base_url(url.clone()),
        None => config,
    };
    let client = RagClient::new(&config);
    debug!("Using RAG server at {}", client.base_url());

    if cli.health {
        let health = client
            .health(cli.timeout())
            .await
            .context("error checking RAG service health")?;
        writeln!(out, "status: {}", health.status)?;
        if health.status != "ok" {
            bail!("RAG service reported status '{}'", health.status);
        }
        return Ok(());
    }

    let question = cli.question().ok_or_else(|| anyhow!("missing question"))?;
    let history = match &cli.history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let result = client
        .query(&question, &history, cli.timeout())
        .await
        .context("error querying RAG service")?;

    if cli.json {
        let json = render_json(&question, &result).context("error encoding response as JSON")?;
        out.write_all(json.as_bytes())?;
    } else {
        out.write_all(render_human(&question, &result).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
