use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by [`crate::client::RagClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The caller supplied an unusable query; nothing was sent.
    #[error("invalid query: {0}")]
    Validation(String),

    #[error("failed to serialize request: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The exchange never produced a response (network, DNS, deadline).
    #[error("request to {url} failed: {cause}")]
    Transport {
        url: String,
        #[source]
        cause: TransportCause,
    },

    /// The server answered with something other than 200 OK.
    #[error("HTTP {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportCause {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Transport { cause, .. } => match cause {
                TransportCause::DeadlineExceeded(_) => true,
                TransportCause::Request(e) => e.is_timeout(),
            },
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error type for the mock server handlers
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    /// Failure injected by the fixture configuration, returned as plain text
    Injected { status: StatusCode, body: String },
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Injected { status, body } => return (status, body).into_response(),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type for mock server handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 500,
            url: "http://127.0.0.1:8001/query".to_string(),
            body: "internal error".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "HTTP 500 from http://127.0.0.1:8001/query: internal error"
        );
    }

    #[test]
    fn test_deadline_is_timeout() {
        let err = ClientError::Transport {
            url: "http://x/query".to_string(),
            cause: TransportCause::DeadlineExceeded(Duration::from_secs(2)),
        };
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("deadline of 2s exceeded"));
        assert!(!ClientError::Validation("empty".to_string()).is_timeout());
    }

    #[test]
    fn test_injected_error_keeps_status() {
        let response = AppError::Injected {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = AppError::ValidationError("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
