use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, artifacts, speak, splice};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router
///
/// Note: body limits, CORS and rate limiting are applied in main.rs
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(speak::speak_get).post(speak::speak_post))
        .route("/stretch", post(splice::stretch_handler))
        .route(
            "/file/{id}",
            get(artifacts::download_artifact).delete(artifacts::delete_artifact),
        )
        .route("/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}
