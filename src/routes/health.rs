use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::schedule::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, always "ok" once the server is up
    pub status: String,
    /// API version
    pub version: String,
    /// "live" when an OpenWeatherMap key is configured, otherwise "simulated-only"
    pub forecast_provider: String,
}

/// Health check endpoint.
///
/// Reports whether live forecasts can be attempted. Without an API key every
/// schedule is computed against the simulated forecast.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let forecast_provider = if state.scheduler.provider().has_api_key() {
        "live"
    } else {
        "simulated-only"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        forecast_provider: forecast_provider.to_string(),
    })
}
