pub mod health;
pub mod schedule;

use axum::routing::{get, post};
use axum::Router;

use schedule::AppState;

/// All API routes, without Swagger UI or middleware.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::health_check))
        .route("/api/v1/schedule", post(schedule::schedule_project))
        .route("/api/v1/catalog", get(schedule::get_catalog))
        .with_state(state)
}
