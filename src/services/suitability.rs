//! Weather suitability scoring for roofing work.
//!
//! A day's score is the product of independent penalty factors, each in
//! [0, 1]. Every factor is a pure function of one forecast field and the
//! configured thresholds, so they can be tested (and tuned) in isolation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::helpers::clamp_unit;
use crate::models::{ForecastDay, ScoredDay, WeatherCondition};

/// Thresholds beyond which roofing work degrades, plus the ramp widths over
/// which each factor falls from 1 to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WeatherConstraints {
    /// Coldest workable daytime temperature (°F)
    pub temp_min_f: f64,
    /// Hottest workable daytime temperature (°F)
    pub temp_max_f: f64,
    /// °F above `temp_max_f` at which the temperature factor reaches 0
    pub heat_ramp_f: f64,
    /// Highest workable wind speed (mph)
    pub wind_max_mph: f64,
    pub wind_ramp_mph: f64,
    /// Highest workable precipitation (inches)
    pub precip_max_in: f64,
    pub precip_ramp_in: f64,
    /// Highest workable relative humidity (%)
    pub humidity_max_pct: f64,
    pub humidity_ramp_pct: f64,
    /// Multiplier for Rain, Thunderstorm and Snow
    pub severe_condition_factor: f64,
    /// Multiplier for Drizzle, Mist and Fog
    pub degraded_condition_factor: f64,
}

impl Default for WeatherConstraints {
    fn default() -> Self {
        Self {
            temp_min_f: 40.0,
            temp_max_f: 95.0,
            heat_ramp_f: 20.0,
            wind_max_mph: 20.0,
            wind_ramp_mph: 15.0,
            precip_max_in: 0.1,
            precip_ramp_in: 0.5,
            humidity_max_pct: 85.0,
            humidity_ramp_pct: 15.0,
            severe_condition_factor: 0.2,
            degraded_condition_factor: 0.7,
        }
    }
}

/// Linear fall-off from 1 at `limit` to 0 at `limit + ramp`.
fn ramp_down(value: f64, limit: f64, ramp: f64) -> f64 {
    if value <= limit {
        1.0
    } else {
        (1.0 - (value - limit) / ramp).max(0.0)
    }
}

/// Temperature factor: proportional below the minimum, ramped above the maximum.
pub fn temperature_factor(temp_day: f64, c: &WeatherConstraints) -> f64 {
    if temp_day < c.temp_min_f {
        (temp_day / c.temp_min_f).max(0.0)
    } else if temp_day > c.temp_max_f {
        ramp_down(temp_day, c.temp_max_f, c.heat_ramp_f)
    } else {
        1.0
    }
}

pub fn wind_factor(wind_speed: f64, c: &WeatherConstraints) -> f64 {
    ramp_down(wind_speed, c.wind_max_mph, c.wind_ramp_mph)
}

pub fn precipitation_factor(precipitation: f64, c: &WeatherConstraints) -> f64 {
    ramp_down(precipitation, c.precip_max_in, c.precip_ramp_in)
}

pub fn humidity_factor(humidity: f64, c: &WeatherConstraints) -> f64 {
    ramp_down(humidity, c.humidity_max_pct, c.humidity_ramp_pct)
}

pub fn condition_factor(condition: WeatherCondition, c: &WeatherConstraints) -> f64 {
    if condition.is_severe() {
        c.severe_condition_factor
    } else if condition.is_degraded() {
        c.degraded_condition_factor
    } else {
        1.0
    }
}

/// Score a day and describe every factor that lowered it.
pub fn assess_day(day: &ForecastDay, c: &WeatherConstraints) -> (f64, Vec<String>) {
    let mut notes = Vec::new();

    let temp = temperature_factor(day.temp_day, c);
    if day.temp_day < c.temp_min_f {
        notes.push(format!(
            "Temperature {:.0}°F below {:.0}°F minimum for material adhesion",
            day.temp_day, c.temp_min_f
        ));
    } else if day.temp_day > c.temp_max_f {
        notes.push(format!(
            "Temperature {:.0}°F above {:.0}°F safe working maximum",
            day.temp_day, c.temp_max_f
        ));
    }

    let wind = wind_factor(day.wind_speed, c);
    if wind < 1.0 {
        notes.push(format!(
            "Wind {:.1} mph exceeds {:.0} mph limit",
            day.wind_speed, c.wind_max_mph
        ));
    }

    let precip = precipitation_factor(day.precipitation, c);
    if precip < 1.0 {
        notes.push(format!(
            "Precipitation {:.2} in exceeds {:.2} in limit",
            day.precipitation, c.precip_max_in
        ));
    }

    let humidity = humidity_factor(day.humidity, c);
    if humidity < 1.0 {
        notes.push(format!(
            "Humidity {:.0}% may affect material curing",
            day.humidity
        ));
    }

    let condition = condition_factor(day.condition, c);
    if condition < 1.0 {
        notes.push(format!("{:?} conditions reduce working time", day.condition));
    }

    let score = clamp_unit(temp * wind * precip * humidity * condition.max(0.0));
    (score, notes)
}

/// Suitability of a single forecast day, in [0, 1].
pub fn score_day(day: &ForecastDay, c: &WeatherConstraints) -> f64 {
    assess_day(day, c).0
}

/// Score every day, preserving input order.
pub fn score_days(days: &[ForecastDay], c: &WeatherConstraints) -> Vec<ScoredDay> {
    days.iter()
        .map(|day| {
            let (score, notes) = assess_day(day, c);
            ScoredDay {
                date: day.date,
                score,
                forecast: day.clone(),
                notes,
            }
        })
        .collect()
}
