use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::FixtureState;
use crate::routes::create_routes;

/// Initialize tracing and logging; `RUST_LOG` wins over `default_filter`.
///
/// Logs go to stderr so stdout stays clean for rendered output.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Create the mock RAG server application
pub fn create_fixture_app(state: Arc<FixtureState>) -> Router {
    info!("Initializing mock RAG router");

    create_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves the mock app on an ephemeral loopback port in the background
pub async fn spawn_fixture(state: Arc<FixtureState>) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_fixture_app(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Mock server error: {}", e);
        }
    });

    info!("Mock RAG server listening on {}", addr);
    Ok((addr, handle))
}
