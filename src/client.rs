//! HTTP client for a RAG server exposing `POST /query` and `GET /health`.
//!
//! Every call is a single request bounded by a caller-supplied timeout.
//! There are no retries and no client-side caching.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransportCause};
use crate::models::{HealthResponse, Message, QueryRequest, QueryResponse, QueryResult};

/// Upper bound on how much of a non-200 body is kept for diagnostics
pub const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Client for a remote RAG service. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct RagClient {
    base_url: String,
    http_client: reqwest::Client,
}

struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl RagClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Use a preconfigured transport instead of the default client
    pub fn with_http_client(config: &ClientConfig, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a question, with optional history, to `{base_url}/query`.
    ///
    /// The query is trimmed and rejected before any I/O when empty. The
    /// timeout covers sending the request and reading the whole response.
    pub async fn query(
        &self,
        query: &str,
        history: &[Message],
        timeout: Duration,
    ) -> ClientResult<QueryResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation(
                "query cannot be empty or only whitespace".to_string(),
            ));
        }

        let request = QueryRequest {
            query: query.to_string(),
            history: history.to_vec(),
        };
        let body = serde_json::to_vec(&request).map_err(ClientError::Serialization)?;

        let url = format!("{}/query", self.base_url);
        debug!(
            "POST {} (history: {} messages, timeout: {:?})",
            url,
            request.history.len(),
            timeout
        );

        let builder = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let raw = self.exchange(builder, &url, timeout).await?;
        let response: QueryResponse = decode(&url, raw.status, &raw.body)?;

        let result = QueryResult {
            response,
            started_at: raw.started_at,
            finished_at: raw.finished_at,
        };
        info!(
            "Query answered with {} documents in {} ms",
            result.response.documents.len(),
            result.latency_ms()
        );
        Ok(result)
    }

    /// Probes `{base_url}/health`
    pub async fn health(&self, timeout: Duration) -> ClientResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {}", url);

        let raw = self
            .exchange(self.http_client.get(&url), &url, timeout)
            .await?;
        decode(&url, raw.status, &raw.body)
    }

    async fn exchange(
        &self,
        builder: RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> ClientResult<RawResponse> {
        let call = async {
            let started_at = Utc::now();
            let response = builder.send().await?;
            let finished_at = Utc::now();

            let status = response.status();
            let body = if status == StatusCode::OK {
                response.bytes().await?.to_vec()
            } else {
                read_capped(response, MAX_ERROR_BODY_BYTES).await?
            };

            Ok::<_, reqwest::Error>(RawResponse {
                status,
                body,
                started_at,
                finished_at,
            })
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(ClientError::Transport {
                url: url.to_string(),
                cause: TransportCause::Request(e),
            }),
            Err(_) => {
                warn!("Request to {} exceeded its {:?} deadline", url, timeout);
                Err(ClientError::Transport {
                    url: url.to_string(),
                    cause: TransportCause::DeadlineExceeded(timeout),
                })
            }
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, status: StatusCode, body: &[u8]) -> ClientResult<T> {
    if status != StatusCode::OK {
        let text = String::from_utf8_lossy(body).trim().to_string();
        warn!("{} answered with HTTP {}", url, status.as_u16());
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body: text,
        });
    }

    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Reads at most `cap` bytes of the body and drops the rest
async fn read_capped(mut response: reqwest::Response, cap: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = cap - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
