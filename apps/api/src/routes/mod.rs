pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::assembly::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assembly API
        .route("/api/v1/assembly/assemble", post(handlers::handle_assemble))
        .route(
            "/api/v1/assembly/parallel-forms",
            post(handlers::handle_parallel_forms),
        )
        .route(
            "/api/v1/assembly/optimize-length",
            post(handlers::handle_optimize_length),
        )
        .route(
            "/api/v1/assembly/content-balance",
            post(handlers::handle_content_balance),
        )
        .route("/api/v1/assembly/blueprint", post(handlers::handle_blueprint))
        .fallback(not_found)
        .with_state(state)
}
