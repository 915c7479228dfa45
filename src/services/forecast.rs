//! Forecast acquisition.
//!
//! The scheduler asks a `WeatherForecastProvider` for a forecast, bounded by
//! a timeout. On any error, timeout or empty answer it falls back once to a
//! seeded simulated forecast, and records which source it used.

use chrono::NaiveDate;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::time::Duration;

use crate::errors::AppError;
use crate::helpers::{date_range_inclusive, fnv1a_64};
use crate::models::{ForecastDay, ForecastSource, WeatherCondition};

/// Source of daily weather forecasts.
///
/// Implementations may fail freely; the scheduler never surfaces their errors
/// to its caller.
pub trait WeatherForecastProvider: Send + Sync {
    /// Fetch up to `days` daily forecasts for `location`, starting today.
    fn fetch_forecast(
        &self,
        location: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<ForecastDay>, AppError>> + Send;
}

/// A forecast together with where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedForecast {
    pub days: Vec<ForecastDay>,
    pub source: ForecastSource,
}

/// Condition mix for simulated days; fair weather is more likely than foul.
const SIMULATED_CONDITIONS: [(WeatherCondition, f64); 4] = [
    (WeatherCondition::Clear, 0.4),
    (WeatherCondition::Clouds, 0.3),
    (WeatherCondition::Rain, 0.2),
    (WeatherCondition::Thunderstorm, 0.1),
];

/// Round to one decimal place, matching provider precision.
fn round_1dp(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn simulate_day(rng: &mut StdRng, date: NaiveDate) -> ForecastDay {
    let temp_min = f64::from(rng.random_range(50..=75_i32));
    let temp_max = temp_min + f64::from(rng.random_range(5..=15_i32));

    let condition = SIMULATED_CONDITIONS
        .choose_weighted(&mut *rng, |(_, weight)| *weight)
        .map(|(c, _)| *c)
        .unwrap_or(WeatherCondition::Clear);

    let (precipitation, description): (f64, &str) = match condition {
        WeatherCondition::Rain => (rng.random_range(0.1..0.5), "light rain"),
        WeatherCondition::Thunderstorm => (rng.random_range(0.5..1.5), "thunderstorm"),
        WeatherCondition::Clouds => (0.0, "partly cloudy"),
        _ => (0.0, "clear sky"),
    };

    ForecastDay {
        date,
        temp_min,
        temp_max,
        temp_day: (temp_min + temp_max) / 2.0,
        humidity: f64::from(rng.random_range(40..=90_i32)),
        wind_speed: round_1dp(rng.random_range(0.0..25.0)),
        precipitation: (precipitation * 100.0).round() / 100.0,
        condition,
        description: description.to_string(),
    }
}

/// Deterministic stand-in forecast for every day from `first` to `last`.
///
/// The same `(seed, location, first, last)` always yields the same forecast.
pub fn simulate_forecast(
    location: &str,
    first: NaiveDate,
    last: NaiveDate,
    seed: u64,
) -> Vec<ForecastDay> {
    let mut rng = StdRng::seed_from_u64(seed ^ fnv1a_64(location));
    date_range_inclusive(first, last)
        .into_iter()
        .map(|date| simulate_day(&mut rng, date))
        .collect()
}

/// Fetch a live forecast, falling back to a simulated one.
///
/// `span` is the inclusive date range the simulation should cover; `None`
/// means there is nothing to simulate and the fallback is empty.
pub async fn resolve_forecast<P: WeatherForecastProvider>(
    provider: &P,
    location: &str,
    days: u32,
    timeout: Duration,
    span: Option<(NaiveDate, NaiveDate)>,
    seed: u64,
) -> ResolvedForecast {
    match tokio::time::timeout(timeout, provider.fetch_forecast(location, days)).await {
        Ok(Ok(forecast)) if !forecast.is_empty() => {
            tracing::debug!(
                "Fetched {} live forecast days for '{}'",
                forecast.len(),
                location
            );
            return ResolvedForecast {
                days: forecast,
                source: ForecastSource::Live,
            };
        }
        Ok(Ok(_)) => {
            tracing::warn!(
                "Forecast provider returned no days for '{}', using simulated forecast",
                location
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(
                "Forecast unavailable for '{}', using simulated forecast: {}",
                location,
                e
            );
        }
        Err(_) => {
            tracing::warn!(
                "Forecast fetch for '{}' timed out after {:?}, using simulated forecast",
                location,
                timeout
            );
        }
    }

    let days = span
        .map(|(first, last)| simulate_forecast(location, first, last, seed))
        .unwrap_or_default();

    ResolvedForecast {
        days,
        source: ForecastSource::Simulated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct FixedProvider(Result<Vec<ForecastDay>, String>);

    impl WeatherForecastProvider for FixedProvider {
        async fn fetch_forecast(
            &self,
            _location: &str,
            _days: u32,
        ) -> Result<Vec<ForecastDay>, AppError> {
            self.0.clone().map_err(AppError::ExternalServiceError)
        }
    }

    struct SlowProvider;

    impl WeatherForecastProvider for SlowProvider {
        async fn fetch_forecast(
            &self,
            _location: &str,
            _days: u32,
        ) -> Result<Vec<ForecastDay>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let a = simulate_forecast("Denver, CO", d("2026-06-01"), d("2026-06-10"), 42);
        let b = simulate_forecast("Denver, CO", d("2026-06-01"), d("2026-06-10"), 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_simulation_varies_with_location() {
        let a = simulate_forecast("Denver, CO", d("2026-06-01"), d("2026-06-20"), 42);
        let b = simulate_forecast("Tampa, FL", d("2026-06-01"), d("2026-06-20"), 42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_simulated_values_in_range() {
        let days = simulate_forecast("Denver, CO", d("2026-06-01"), d("2026-07-30"), 7);
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.date, d("2026-06-01") + chrono::Duration::days(i as i64));
            assert!((50.0..=75.0).contains(&day.temp_min));
            assert!(day.temp_max >= day.temp_min + 5.0 && day.temp_max <= day.temp_min + 15.0);
            assert!((40.0..=90.0).contains(&day.humidity));
            assert!((0.0..=25.0).contains(&day.wind_speed));
            match day.condition {
                WeatherCondition::Clear | WeatherCondition::Clouds => {
                    assert_eq!(day.precipitation, 0.0)
                }
                WeatherCondition::Rain => assert!((0.1..=0.5).contains(&day.precipitation)),
                WeatherCondition::Thunderstorm => {
                    assert!((0.5..=1.5).contains(&day.precipitation))
                }
                other => panic!("unexpected simulated condition {:?}", other),
            }
        }
    }

    #[test]
    fn test_simulation_empty_span() {
        assert!(simulate_forecast("x", d("2026-06-02"), d("2026-06-01"), 1).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_live() {
        let day = simulate_forecast("x", d("2026-06-01"), d("2026-06-01"), 1).remove(0);
        let provider = FixedProvider(Ok(vec![day]));
        let resolved = resolve_forecast(
            &provider,
            "x",
            1,
            Duration::from_secs(5),
            Some((d("2026-06-01"), d("2026-06-03"))),
            1,
        )
        .await;
        assert_eq!(resolved.source, ForecastSource::Live);
        assert_eq!(resolved.days.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_error_falls_back() {
        let provider = FixedProvider(Err("boom".to_string()));
        let resolved = resolve_forecast(
            &provider,
            "x",
            3,
            Duration::from_secs(5),
            Some((d("2026-06-01"), d("2026-06-03"))),
            1,
        )
        .await;
        assert_eq!(resolved.source, ForecastSource::Simulated);
        assert_eq!(resolved.days.len(), 3);
    }

    #[tokio::test]
    async fn test_resolve_empty_falls_back() {
        let provider = FixedProvider(Ok(Vec::new()));
        let resolved =
            resolve_forecast(&provider, "x", 3, Duration::from_secs(5), None, 1).await;
        assert_eq!(resolved.source, ForecastSource::Simulated);
        assert!(resolved.days.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_timeout_falls_back() {
        let resolved = resolve_forecast(
            &SlowProvider,
            "x",
            3,
            Duration::from_millis(50),
            Some((d("2026-06-01"), d("2026-06-02"))),
            1,
        )
        .await;
        assert_eq!(resolved.source, ForecastSource::Simulated);
        assert_eq!(resolved.days.len(), 2);
    }
}
