//! tracelens Web Server
//!
//! Axum-based HTTP endpoint that turns a failing snippet and its trace into
//! an explanation from the inference API.

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracelens_llm::InferenceClient;

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(routes::analyze::analyze))
        .route("/health", get(routes::health::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn run_server(client: InferenceClient, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    serve(listener, client).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: tokio::net::TcpListener, client: InferenceClient) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let state = AppState::new(client);
    let app = create_router(state);

    tracing::info!("Analyze endpoint listening on http://{}/analyze", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
