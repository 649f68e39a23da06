use std::env;

use anyhow::Context;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8001";
pub const BASE_URL_ENV: &str = "RAG_BASE_URL";

/// Client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Explicit base URL; beats the environment when set
    pub base_url: Option<String>,
    env_base_url: Option<String>,
}

impl ClientConfig {
    /// Configuration with `RAG_BASE_URL` captured from the process environment
    pub fn from_env() -> Self {
        Self {
            base_url: None,
            env_base_url: env::var(BASE_URL_ENV).ok(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn base_url(&self) -> String {
        resolve_base_url(self.base_url.as_deref(), self.env_base_url.as_deref())
    }
}

/// Picks explicit > environment > default, ignoring blank values
pub fn resolve_base_url(explicit: Option<&str>, env_value: Option<&str>) -> String {
    let chosen = [explicit, env_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);
    chosen.trim_end_matches('/').to_string()
}

/// Bind settings for the mock RAG server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a valid number, got '{}'", raw))?,
            Err(_) => 8001,
        };
        Ok(Self { host, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
