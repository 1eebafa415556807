use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

// API Routes - REST API for the chat client and dashboard
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Natural-language chat
            .route("/ask", post(handlers::api::ask))
            // Live schema description
            .route("/schema", get(handlers::api::get_schema))
            // Chart artifact regeneration
            .route("/reports/refresh", post(handlers::api::refresh_reports))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
