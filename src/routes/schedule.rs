use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{AvailableResources, ProjectDetails, ScheduleResult};
use crate::services::catalog::ProjectType;
use crate::services::openweathermap::OpenWeatherMapClient;
use crate::services::scheduler::Scheduler;
use crate::services::suitability::WeatherConstraints;

/// Shared application state for the scheduling routes.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler<OpenWeatherMapClient>>,
}

/// Request body for `POST /api/v1/schedule`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    pub project: ProjectDetails,
    /// Free-text location, e.g. "Denver, CO"
    pub location: String,
    /// Dates the caller can work, in any order
    #[schema(value_type = Vec<String>)]
    pub available_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub available_resources: AvailableResources,
}

/// The project catalog and weather thresholds the scheduler runs with.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub project_types: Vec<ProjectType>,
    pub weather_constraints: WeatherConstraints,
}

/// Schedule a roofing project into the best weather window.
///
/// Classifies the project, scores each available day against the forecast
/// for the location and picks the best run of consecutive days. A missing
/// window or a resource shortfall is reported in the body, not as an error.
#[utoipa::path(
    post,
    path = "/api/v1/schedule",
    tag = "Scheduling",
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Scheduling outcome", body = ScheduleResult),
        (status = 400, description = "Invalid project details or location", body = ErrorResponse),
    )
)]
pub async fn schedule_project(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResult>, AppError> {
    let location = request.location.trim();
    if location.is_empty() {
        return Err(AppError::InvalidInput(
            "location must not be empty".to_string(),
        ));
    }

    tracing::info!(
        "Scheduling '{}' ({} squares) in '{}' across {} available dates",
        request.project.repair_kind,
        request.project.area_squares,
        location,
        request.available_dates.len()
    );

    let result = state
        .scheduler
        .schedule_project(
            &request.project,
            location,
            &request.available_dates,
            &request.available_resources,
        )
        .await?;

    Ok(Json(result))
}

/// List the project types and weather thresholds in use.
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "Scheduling",
    responses(
        (status = 200, description = "Project catalog", body = CatalogResponse),
    )
)]
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        project_types: state.scheduler.catalog().entries().cloned().collect(),
        weather_constraints: state.scheduler.constraints().clone(),
    })
}
