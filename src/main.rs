// Roof Scheduler API v0.1
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use roof_scheduler::config::{AppConfig, LogFormat};
use roof_scheduler::routes::{self, schedule::AppState};
use roof_scheduler::services::openweathermap::OpenWeatherMapClient;
use roof_scheduler::services::scheduler::Scheduler;
use roof_scheduler::{errors, models, services};

/// OpenAPI document for the Roof Scheduler API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roof Scheduler API",
        version = "0.1.0",
        description = "Weather-aware scheduling for roofing projects. \
            Classifies a job into a project type, scores the caller's available days \
            against an OpenWeatherMap daily forecast (or a seeded simulation when the \
            forecast is unavailable), picks the best window of consecutive days and \
            checks crew and equipment for it.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Scheduling", description = "Project scheduling and catalog"),
    ),
    paths(
        routes::health::health_check,
        routes::schedule::schedule_project,
        routes::schedule::get_catalog,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::schedule::ScheduleRequest,
            routes::schedule::CatalogResponse,
            models::ProjectDetails,
            models::AvailableResources,
            models::ForecastDay,
            models::ScoredDay,
            models::WeatherCondition,
            models::ResourceAllocation,
            models::ForecastSource,
            models::ScheduleResult,
            services::catalog::ProjectType,
            services::suitability::WeatherConstraints,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");

    // Initialize tracing
    let json_logs = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roof_scheduler=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let (catalog, constraints) = config
        .load_catalog()
        .expect("Failed to load project catalog");
    tracing::info!(
        "Project catalog ready with {} project types",
        catalog.entries().count()
    );

    let client = OpenWeatherMapClient::new(
        config.openweathermap_api_key.clone(),
        &config.openweathermap_base_url,
    )
    .expect("Failed to build OpenWeatherMap client");
    if !client.has_api_key() {
        tracing::warn!("OPENWEATHERMAP_API_KEY not set, all schedules use simulated forecasts");
    }

    let app_state = AppState {
        scheduler: Arc::new(Scheduler::new(
            client,
            catalog,
            constraints,
            config.scheduler_settings(),
        )),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let app = routes::api_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
