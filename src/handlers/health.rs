use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::handlers::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    info!("Health check requested");

    let [primary, pdf, word] = state.extractor.backend_names();
    let options = state.extractor.options();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "backends": {
            "primary": primary,
            "pdf_fallback": pdf,
            "word_fallback": word
        },
        "extractor": {
            "parse_on_blocking_pool": options.parse_on_blocking_pool,
            "max_archive_entry_bytes": options.max_archive_entry_bytes
        },
        "max_file_size_mb": state.config.max_file_size_mb
    }))
}

/// Readiness check endpoint. The extractor is built before the listener
/// opens, so reaching this handler means it is ready.
pub async fn ready_handler() -> StatusCode {
    info!("Readiness check passed");
    StatusCode::OK
}
