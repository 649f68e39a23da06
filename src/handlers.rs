use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{Document, HealthResponse, QueryRequest, QueryResponse};

/// Canned behaviour of the mock RAG server
#[derive(Debug, Default)]
pub struct FixtureState {
    /// Fixed answer; when unset the query is echoed back
    pub answer: Option<String>,
    pub documents: Vec<Document>,
    /// Delay applied before answering `/query`
    pub delay: Duration,
    /// When set, `/query` fails with this status and plain-text body
    pub failure: Option<(StatusCode, String)>,
    hits: AtomicUsize,
}

impl FixtureState {
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_failure(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.failure = Some((status, body.into()));
        self
    }

    /// Number of `/query` requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Health check handler
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");
    Ok(ResponseJson(HealthResponse::ok()))
}

/// Answers a query from the fixture state
pub async fn query_handler(
    State(state): State<Arc<FixtureState>>,
    Json(payload): Json<QueryRequest>,
) -> AppResult<ResponseJson<QueryResponse>> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    info!(
        "Query endpoint called with query: {} ({} history messages)",
        payload.query,
        payload.history.len()
    );

    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Query cannot be empty or only whitespace".to_string(),
        ));
    }

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    if let Some((status, body)) = &state.failure {
        return Err(AppError::Injected {
            status: *status,
            body: body.clone(),
        });
    }

    let answer = state
        .answer
        .clone()
        .unwrap_or_else(|| format!("echo: {}", payload.query));

    Ok(ResponseJson(QueryResponse {
        answer,
        documents: state.documents.clone(),
    }))
}
