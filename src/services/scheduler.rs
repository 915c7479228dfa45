//! Schedule assembly.
//!
//! Orchestrates one scheduling call:
//!
//! 1. classify the project into a catalog entry
//! 2. fetch a forecast (live, or simulated on failure)
//! 3. keep only forecast days the caller is available
//! 4. score each day
//! 5. pick the best consecutive window
//! 6. check crew and equipment for that window
//! 7. summarize weather risks over the window
//!
//! Resource shortfalls never trigger a new search: the weather-optimal window
//! is reported with its constraints and the caller decides.

use chrono::{NaiveDate, Utc};
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use crate::errors::AppError;
use crate::helpers::{add_days, sorted_unique_dates};
use crate::models::{
    AvailableResources, ForecastDay, ForecastSource, ProjectDetails, ScheduleResult, ScoredDay,
};
use crate::services::allocation::allocate_resources;
use crate::services::catalog::{ProjectCatalog, ProjectType};
use crate::services::forecast::{resolve_forecast, WeatherForecastProvider};
use crate::services::openweathermap::OWM_MAX_FORECAST_DAYS;
use crate::services::suitability::{score_days, WeatherConstraints};
use crate::services::window::{find_best_window, WindowOutcome};

/// Reason reported when none of the caller's dates are covered by the forecast.
pub const NO_AVAILABLE_DATES_IN_FORECAST: &str = "no available dates in forecast range";

pub const HIGH_WIND_RISK: &str = "High wind conditions may delay work";
pub const RAIN_RISK: &str = "Rain forecast may impact schedule";

/// Wind speed (mph) above which a window day is flagged as a risk.
const RISK_WIND_MPH: f64 = 15.0;
/// Precipitation (inches) above which a window day is flagged as a risk.
const RISK_PRECIP_IN: f64 = 0.1;

/// Tunables that are not part of the catalog.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub forecast_timeout: Duration,
    /// Base seed for simulated forecasts
    pub simulation_seed: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            forecast_timeout: Duration::from_secs(10),
            simulation_seed: 42,
        }
    }
}

/// Weather- and resource-aware project scheduler.
///
/// Holds only immutable configuration, so one instance can serve concurrent
/// requests behind an `Arc`.
#[derive(Debug)]
pub struct Scheduler<P> {
    provider: P,
    catalog: ProjectCatalog,
    constraints: WeatherConstraints,
    settings: SchedulerSettings,
}

/// Days of forecast needed to reach `last` from `today`, within provider limits.
pub fn forecast_days_needed(today: NaiveDate, last: Option<NaiveDate>) -> u32 {
    let span = last
        .map(|l| (l - today).num_days() + 1)
        .unwrap_or(1)
        .clamp(1, i64::from(OWM_MAX_FORECAST_DAYS));
    u32::try_from(span).unwrap_or(1)
}

/// Dates a simulated forecast should cover: the caller's dates, limited to
/// the same horizon a live forecast would reach from `today`.
pub fn simulation_span(
    today: NaiveDate,
    sorted_dates: &[NaiveDate],
) -> Option<(NaiveDate, NaiveDate)> {
    let horizon = add_days(today, OWM_MAX_FORECAST_DAYS - 1);
    let first = (*sorted_dates.first()?).max(today);
    let last = (*sorted_dates.last()?).min(horizon);
    (first <= last).then_some((first, last))
}

/// Risk messages for a window, de-duplicated and sorted.
pub fn risk_factors(window: &[ScoredDay]) -> Vec<String> {
    let mut risks = BTreeSet::new();
    for day in window {
        if day.forecast.wind_speed > RISK_WIND_MPH {
            risks.insert(HIGH_WIND_RISK.to_string());
        }
        if day.forecast.precipitation > RISK_PRECIP_IN {
            risks.insert(RAIN_RISK.to_string());
        }
    }
    risks.into_iter().collect()
}

/// Forecast days whose date the caller is available, chronological and unique.
fn candidate_days(
    forecast: Vec<ForecastDay>,
    available: &HashSet<NaiveDate>,
) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = forecast
        .into_iter()
        .filter(|day| available.contains(&day.date))
        .collect();
    days.sort_by_key(|day| day.date);
    days.dedup_by_key(|day| day.date);
    days
}

impl<P: WeatherForecastProvider> Scheduler<P> {
    pub fn new(
        provider: P,
        catalog: ProjectCatalog,
        constraints: WeatherConstraints,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            provider,
            catalog,
            constraints,
            settings,
        }
    }

    /// A scheduler with the canonical catalog and default thresholds.
    pub fn with_defaults(provider: P) -> Self {
        Self::new(
            provider,
            ProjectCatalog::default(),
            WeatherConstraints::default(),
            SchedulerSettings::default(),
        )
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    pub fn constraints(&self) -> &WeatherConstraints {
        &self.constraints
    }

    /// Schedule a project into the best weather window among `available_dates`.
    ///
    /// Only invalid input is an error; every business outcome (no window,
    /// short on crew, forecast fallback) is reported in the result.
    pub async fn schedule_project(
        &self,
        project: &ProjectDetails,
        location: &str,
        available_dates: &[NaiveDate],
        resources: &AvailableResources,
    ) -> Result<ScheduleResult, AppError> {
        self.schedule_project_from(
            Utc::now().date_naive(),
            project,
            location,
            available_dates,
            resources,
        )
        .await
    }

    /// As `schedule_project`, with an explicit "today" for sizing the forecast request.
    pub async fn schedule_project_from(
        &self,
        today: NaiveDate,
        project: &ProjectDetails,
        location: &str,
        available_dates: &[NaiveDate],
        resources: &AvailableResources,
    ) -> Result<ScheduleResult, AppError> {
        let project_type = self
            .catalog
            .classify(&project.repair_kind, project.area_squares)?
            .clone();
        tracing::debug!(
            "Classified '{}' ({} squares) as {} ({} days)",
            project.repair_kind,
            project.area_squares,
            project_type.id,
            project_type.duration_days
        );

        let dates = sorted_unique_dates(available_dates);
        let span = simulation_span(today, &dates);
        let days = forecast_days_needed(today, dates.last().copied());

        let forecast = resolve_forecast(
            &self.provider,
            location,
            days,
            self.settings.forecast_timeout,
            span,
            self.settings.simulation_seed,
        )
        .await;
        tracing::debug!(
            "Forecast for '{}': {} days ({})",
            location,
            forecast.days.len(),
            forecast.source.as_str()
        );

        let available: HashSet<NaiveDate> = dates.iter().copied().collect();
        let candidates = candidate_days(forecast.days, &available);
        if candidates.is_empty() {
            tracing::info!("No available dates in forecast range for '{}'", location);
            return Ok(unscheduled(
                location,
                &project_type,
                Vec::new(),
                NO_AVAILABLE_DATES_IN_FORECAST,
                Vec::new(),
                forecast.source,
            ));
        }

        let scored = score_days(&candidates, &self.constraints);
        tracing::debug!("Scored {} candidate days", scored.len());

        let window = match find_best_window(&scored, project_type.duration_days)? {
            WindowOutcome::Found(window) => window,
            WindowOutcome::NotFound(failure) => {
                tracing::info!(
                    "No {}-day window for '{}': {}",
                    project_type.duration_days,
                    location,
                    failure.reason
                );
                return Ok(unscheduled(
                    location,
                    &project_type,
                    scored.clone(),
                    &failure.reason,
                    failure.suggested_dates,
                    forecast.source,
                ));
            }
        };

        let start_date = window.start_date;
        let risks = risk_factors(window.days);
        tracing::debug!(
            "Best window starts {} (mean score {:.3})",
            start_date,
            window.average_score
        );

        let allocation = allocate_resources(&project_type, start_date, resources)?;
        if !allocation.feasible {
            tracing::info!(
                "Window from {} is resource-infeasible: {}",
                start_date,
                allocation.constraints.join("; ")
            );
        }

        Ok(ScheduleResult {
            is_scheduled: true,
            location: location.to_string(),
            project_type: project_type.id.clone(),
            duration_days: project_type.duration_days,
            start_date: Some(start_date),
            end_date: Some(allocation.end_date),
            weather_scores: scored,
            resource_allocation: Some(allocation),
            risk_factors: risks,
            reason: None,
            suggested_dates: None,
            forecast_source: forecast.source,
        })
    }
}

fn unscheduled(
    location: &str,
    project_type: &ProjectType,
    weather_scores: Vec<ScoredDay>,
    reason: &str,
    suggested_dates: Vec<NaiveDate>,
    forecast_source: ForecastSource,
) -> ScheduleResult {
    ScheduleResult {
        is_scheduled: false,
        location: location.to_string(),
        project_type: project_type.id.clone(),
        duration_days: project_type.duration_days,
        start_date: None,
        end_date: None,
        weather_scores,
        resource_allocation: None,
        risk_factors: Vec::new(),
        reason: Some(reason.to_string()),
        suggested_dates: Some(suggested_dates),
        forecast_source,
    }
}
