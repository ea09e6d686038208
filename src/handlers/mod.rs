pub mod extract;
pub mod health;

pub use extract::*;
pub use health::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::logging_middleware;
use crate::services::DocumentExtractor;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<DocumentExtractor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let extractor = DocumentExtractor::new(config.extractor_options());
        Self::with_extractor(config, extractor)
    }

    pub fn with_extractor(config: Config, extractor: DocumentExtractor) -> Self {
        Self {
            config: Arc::new(config),
            extractor: Arc::new(extractor),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/extract-text", post(extract_handler))
        .route("/api/extract-text/binary", post(extract_binary_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
        .with_state(state)
}
