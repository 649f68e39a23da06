pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;

// Re-export key types for convenience
pub use app::init_tracing;
pub use client::RagClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use models::{Document, Message, MetaValue, QueryResponse, QueryResult};
