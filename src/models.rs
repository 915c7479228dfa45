//! Value types flowing through the scheduler.
//!
//! Everything here is created fresh per scheduling call and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Main weather condition of a day, as reported by the forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Drizzle,
    Mist,
    Fog,
}

impl WeatherCondition {
    /// Map an OpenWeatherMap `weather[0].main` value onto a condition.
    ///
    /// The atmosphere group (Haze, Smoke, Dust, ...) all reduce visibility
    /// and are folded into `Mist`.
    pub fn from_owm_main(main: &str) -> Self {
        match main.to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" => Self::Rain,
            "thunderstorm" => Self::Thunderstorm,
            "snow" => Self::Snow,
            "drizzle" => Self::Drizzle,
            "fog" => Self::Fog,
            "mist" => Self::Mist,
            other => {
                tracing::debug!("Unmapped weather condition '{}', treating as Mist", other);
                Self::Mist
            }
        }
    }

    /// Conditions under which roofing work is effectively impossible.
    pub fn is_severe(self) -> bool {
        matches!(self, Self::Rain | Self::Thunderstorm | Self::Snow)
    }

    /// Conditions that slow work down without stopping it.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Drizzle | Self::Mist | Self::Fog)
    }
}

/// One day of forecast, in imperial units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastDay {
    /// Calendar date (YYYY-MM-DD)
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Minimum temperature in °F
    pub temp_min: f64,
    /// Maximum temperature in °F
    pub temp_max: f64,
    /// Daytime temperature in °F
    pub temp_day: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in mph
    pub wind_speed: f64,
    /// Precipitation in inches
    pub precipitation: f64,
    pub condition: WeatherCondition,
    /// Free-text description (e.g. "light rain")
    pub description: String,
}

/// A forecast day together with its roofing suitability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoredDay {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Suitability in [0, 1]; 1.0 is ideal roofing weather
    pub score: f64,
    pub forecast: ForecastDay,
    /// One line per weather factor that lowered the score
    pub notes: Vec<String>,
}

/// Description of the job to schedule.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetails {
    /// "spot_repair", "partial_replacement" or "full_replacement"
    pub repair_kind: String,
    /// Roof area in squares (1 square = 100 sq ft)
    pub area_squares: f64,
}

/// Crew and equipment the caller can commit to the project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AvailableResources {
    pub crew_members: u32,
    /// Equipment id -> number of units available
    #[serde(default)]
    pub equipment: HashMap<String, u32>,
}

/// Resources assigned to a chosen window, with any shortfalls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceAllocation {
    pub project_type: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub crew_size: u32,
    pub equipment: Vec<String>,
    /// Unmet requirements, in the order they were checked
    pub constraints: Vec<String>,
    /// True iff `constraints` is empty
    pub feasible: bool,
}

/// Where the scored forecast came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSource {
    Live,
    Simulated,
}

impl ForecastSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Simulated => "simulated",
        }
    }
}

/// Outcome of a scheduling call.
///
/// `start_date`, `end_date` and `resource_allocation` are present iff
/// `is_scheduled`; `reason` and `suggested_dates` are present iff not.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResult {
    pub is_scheduled: bool,
    pub location: String,
    /// Catalog entry the project was classified as
    pub project_type: String,
    pub duration_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    /// Every candidate day, chronologically
    pub weather_scores: Vec<ScoredDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_allocation: Option<ResourceAllocation>,
    /// De-duplicated, sorted risk messages for the chosen window
    pub risk_factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub suggested_dates: Option<Vec<NaiveDate>>,
    pub forecast_source: ForecastSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_from_owm_main() {
        assert_eq!(WeatherCondition::from_owm_main("Clear"), WeatherCondition::Clear);
        assert_eq!(
            WeatherCondition::from_owm_main("Thunderstorm"),
            WeatherCondition::Thunderstorm
        );
        assert_eq!(WeatherCondition::from_owm_main("Haze"), WeatherCondition::Mist);
    }

    #[test]
    fn test_condition_groups() {
        assert!(WeatherCondition::Snow.is_severe());
        assert!(!WeatherCondition::Snow.is_degraded());
        assert!(WeatherCondition::Fog.is_degraded());
        assert!(!WeatherCondition::Clouds.is_severe());
        assert!(!WeatherCondition::Clouds.is_degraded());
    }

    #[test]
    fn test_forecast_source_serializes_lowercase() {
        let json = serde_json::to_string(&ForecastSource::Simulated).unwrap();
        assert_eq!(json, "\"simulated\"");
        assert_eq!(ForecastSource::Live.as_str(), "live");
    }

    #[test]
    fn test_available_resources_equipment_defaults_empty() {
        let res: AvailableResources = serde_json::from_str(r#"{"crew_members": 3}"#).unwrap();
        assert_eq!(res.crew_members, 3);
        assert!(res.equipment.is_empty());
    }
}
