pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cv/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/cv/analysis",
            get(handlers::handle_get_analysis).delete(handlers::handle_reset_analysis),
        )
        .route(
            "/api/v1/cv/analysis/cancel",
            post(handlers::handle_cancel_analysis),
        )
        .with_state(state)
}
