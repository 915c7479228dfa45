//! Weather- and resource-aware scheduling for roofing projects.
//!
//! The library is pure apart from the forecast fetch: classify a project,
//! score each available day against the forecast, pick the best run of
//! consecutive days and check crew and equipment for it.

pub mod config;
pub mod errors;
pub mod helpers;
pub mod models;
pub mod routes;
pub mod services;

pub use errors::AppError;
pub use models::{AvailableResources, ForecastDay, ProjectDetails, ScheduleResult};
pub use services::forecast::WeatherForecastProvider;
pub use services::scheduler::Scheduler;
