// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::analysis_service::AnalysisService;
use crate::application::comparison_service::ComparisonService;
use crate::infrastructure::config::load_analyzer_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{analyze_document, compare_documents, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_analyzer_config()?;

    // Create services (application layer)
    let analysis_service = AnalysisService::new(config.analysis.clone());
    let comparison_service = ComparisonService::new(config.comparison, config.analysis);

    // Create application state
    let state = Arc::new(AppState {
        analysis_service,
        comparison_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/analyze", post(analyze_document))
        .route("/compare", post(compare_documents))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting battery-analytics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
