use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A single conversation turn sent as history alongside a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Request payload for the `/query` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
}

impl QueryRequest {
    /// Validates if the query is not empty or just whitespace
    pub fn is_valid(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Free-form metadata value attached to a document by the server.
///
/// The server does not fix a schema for metadata, so every JSON shape is
/// representable here while still being a closed set of variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<MetaValue>),
    Object(IndexMap<String, MetaValue>),
}

/// Strings print verbatim, null prints as nothing, nested values as
/// compact JSON.
impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => Ok(()),
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Number(n) => write!(f, "{}", n),
            MetaValue::String(s) => f.write_str(s),
            MetaValue::Array(_) | MetaValue::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Opaque document identifier: any JSON scalar the server chooses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Null => Ok(()),
            DocumentId::Bool(b) => write!(f, "{}", b),
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

/// Treats an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A retrieved source document, as ranked by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: DocumentId,
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: IndexMap<String, MetaValue>,
}

impl Document {
    /// Display form of a metadata entry, `None` when absent or empty
    pub fn meta_display(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .map(|v| v.to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Response payload of the `/query` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Document>,
}

/// Response payload for the health check endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: Some("Service is healthy".to_string()),
        }
    }
}

/// Outcome of a single `/query` call together with its timing
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub response: QueryResponse,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl QueryResult {
    /// Wall time spent on the HTTP exchange, never negative
    pub fn latency(&self) -> std::time::Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_request_round_trip() {
        let cases = [
            QueryRequest {
                query: "how do I install it?".to_string(),
                history: vec![
                    Message::user("hi"),
                    Message::assistant("hello"),
                    Message::user("hi"),
                ],
            },
            QueryRequest {
                query: "o que é RAG? 日本語 🚀".to_string(),
                history: Vec::new(),
            },
            QueryRequest {
                query: "say \"hi\"\nthen\t\\quit".to_string(),
                history: vec![Message::user(""), Message::new("system", "line1\nline2")],
            },
            QueryRequest {
                query: "x".to_string(),
                history: vec![Message::assistant("{\"nested\": [1, 2]}")],
            },
        ];

        for request in cases {
            let json = serde_json::to_string(&request).unwrap();
            let decoded: QueryRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, request, "round trip of {json}");
        }
    }

    #[test]
    fn test_empty_history_is_omitted() {
        let request = QueryRequest {
            query: "what is X".to_string(),
            history: Vec::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "query": "what is X" }));
    }

    #[test]
    fn test_is_valid() {
        let mut request = QueryRequest {
            query: "  \t\n".to_string(),
            history: Vec::new(),
        };
        assert!(!request.is_valid());
        request.query = " x ".to_string();
        assert!(request.is_valid());
    }

    #[test]
    fn test_decode_response_preserves_order_and_metadata() {
        let body = r#"{
            "answer": "X is Y",
            "documents": [
                {"id": 1, "score": 0.92, "text": "a", "metadata": {"source": "doc1", "page": 3, "tags": ["a", "b"]}},
                {"id": "chunk-7", "score": 0.5, "text": "b", "metadata": {"lang": null, "ok": true}}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.documents.len(), 2);
        let first = &response.documents[0];
        assert_eq!(first.id.to_string(), "1");
        assert_eq!(first.meta_display("source").as_deref(), Some("doc1"));
        assert_eq!(first.meta_display("page").as_deref(), Some("3"));
        assert_eq!(first.meta_display("tags").as_deref(), Some(r#"["a","b"]"#));
        let keys: Vec<&str> = first.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, ["source", "page", "tags"]);

        let second = &response.documents[1];
        assert_eq!(second.id, DocumentId::Text("chunk-7".to_string()));
        assert_eq!(second.meta_display("lang"), None);
        assert_eq!(second.meta_display("missing"), None);
        assert_eq!(second.meta_display("ok").as_deref(), Some("true"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"answer": "a", "documents": [{"id": 2, "score": 1}]}"#)
                .unwrap();
        assert!(response.documents[0].text.is_empty());
        assert!(response.documents[0].metadata.is_empty());

        let response: QueryResponse = serde_json::from_str(r#"{"answer": "a"}"#).unwrap();
        assert!(response.documents.is_empty());
    }

    #[test]
    fn test_any_scalar_id_decodes() {
        let body = r#"{"answer": "a", "documents": [
            {"id": true, "score": 0.1},
            {"id": null, "score": 0.2},
            {"score": 0.3},
            {"id": 2.5, "score": 0.4}
        ]}"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<&DocumentId> = response.documents.iter().map(|d| &d.id).collect();

        assert_eq!(ids[0], &DocumentId::Bool(true));
        assert_eq!(ids[1], &DocumentId::Null);
        assert_eq!(ids[2], &DocumentId::Null);
        assert_eq!(ids[0].to_string(), "true");
        assert_eq!(ids[1].to_string(), "");
        assert_eq!(ids[3].to_string(), "2.5");
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"answer": "a", "documents": [{"id": 1, "score": 1, "text": null, "metadata": null}]}"#,
        )
        .unwrap();
        assert!(response.documents[0].metadata.is_empty());
        assert!(response.documents[0].text.is_empty());

        let response: QueryResponse =
            serde_json::from_str(r#"{"answer": "a", "documents": null}"#).unwrap();
        assert!(response.documents.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<QueryResponse>(r#"{"documents": []}"#).is_err());
        assert!(
            serde_json::from_str::<QueryResponse>(
                r#"{"answer": "a", "documents": [{"id": 1, "score": "high"}]}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_latency_never_negative() {
        let now = Utc::now();
        let response = QueryResponse {
            answer: String::new(),
            documents: Vec::new(),
        };
        let result = QueryResult {
            response: response.clone(),
            started_at: now,
            finished_at: now - Duration::milliseconds(5),
        };
        assert_eq!(result.latency_ms(), 0);

        let result = QueryResult {
            response,
            started_at: now,
            finished_at: now + Duration::milliseconds(1234),
        };
        assert_eq!(result.latency_ms(), 1234);
    }
}
