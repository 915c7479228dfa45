//! OpenWeatherMap daily forecast client.
//!
//! Fetches up to 16 days of daily forecast in imperial units.
//! See: https://openweathermap.org/forecast16

use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{ForecastDay, WeatherCondition};
use crate::services::forecast::WeatherForecastProvider;

pub const OWM_DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Longest forecast the daily endpoint serves.
pub const OWM_MAX_FORECAST_DAYS: u32 = 16;

const MM_PER_INCH: f64 = 25.4;

/// Client for the OpenWeatherMap daily forecast API.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmDailyResponse {
    #[serde(default)]
    city: Option<OwmCity>,
    list: Vec<OwmDay>,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    /// Shift in seconds from UTC
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct OwmDay {
    dt: i64,
    temp: OwmTemp,
    humidity: f64,
    speed: f64,
    /// Precipitation volume in mm; absent on dry days
    rain: Option<f64>,
    snow: Option<f64>,
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmTemp {
    min: f64,
    max: f64,
    day: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch and parse the daily forecast for a free-text location.
    pub async fn fetch_daily(
        &self,
        location: &str,
        days: u32,
    ) -> Result<Vec<ForecastDay>, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::ExternalServiceError("No OpenWeatherMap API key configured".to_string())
        })?;

        let cnt = days.clamp(1, OWM_MAX_FORECAST_DAYS).to_string();
        let url = format!("{}/forecast/daily", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("roof-scheduler/", env!("CARGO_PKG_VERSION"))),
        );

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&[
                ("q", location),
                ("cnt", cnt.as_str()),
                ("units", "imperial"),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("OpenWeatherMap request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "OpenWeatherMap returned HTTP {}",
                response.status()
            )));
        }

        let raw_json: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("OpenWeatherMap JSON parse error: {}", e))
        })?;

        parse_daily_forecast(&raw_json)
    }
}

impl WeatherForecastProvider for OpenWeatherMapClient {
    async fn fetch_forecast(
        &self,
        location: &str,
        days: u32,
    ) -> Result<Vec<ForecastDay>, AppError> {
        self.fetch_daily(location, days).await
    }
}

/// Convert a raw daily forecast response into `ForecastDay`s.
///
/// Pure function (no I/O). Dates are taken in the location's own timezone
/// when the response carries one.
pub fn parse_daily_forecast(raw_json: &serde_json::Value) -> Result<Vec<ForecastDay>, AppError> {
    let response: OwmDailyResponse = serde_json::from_value(raw_json.clone()).map_err(|e| {
        AppError::ExternalServiceError(format!("OpenWeatherMap response structure error: {}", e))
    })?;

    let tz_offset = response.city.as_ref().map(|c| c.timezone).unwrap_or(0);

    response
        .list
        .iter()
        .map(|day| parse_day(day, tz_offset))
        .collect()
}

fn local_date(dt: i64, tz_offset: i64) -> Result<NaiveDate, AppError> {
    DateTime::from_timestamp(dt + tz_offset, 0)
        .map(|t| t.date_naive())
        .ok_or_else(|| {
            AppError::ExternalServiceError(format!("OpenWeatherMap timestamp out of range: {}", dt))
        })
}

fn parse_day(day: &OwmDay, tz_offset: i64) -> Result<ForecastDay, AppError> {
    let (condition, description) = day
        .weather
        .first()
        .map(|w| (WeatherCondition::from_owm_main(&w.main), w.description.clone()))
        .unwrap_or((WeatherCondition::Clear, "unknown".to_string()));

    let precipitation_mm = day.rain.unwrap_or(0.0) + day.snow.unwrap_or(0.0);

    Ok(ForecastDay {
        date: local_date(day.dt, tz_offset)?,
        temp_min: day.temp.min,
        temp_max: day.temp.max,
        temp_day: day.temp.day,
        humidity: day.humidity,
        wind_speed: day.speed,
        precipitation: precipitation_mm / MM_PER_INCH,
        condition,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_response() -> serde_json::Value {
        serde_json::json!({
            "city": { "name": "Denver", "timezone": -21600 },
            "cnt": 2,
            "list": [
                {
                    "dt": 1780336800,
                    "temp": { "min": 55.0, "max": 78.0, "day": 72.5 },
                    "humidity": 40,
                    "speed": 6.5,
                    "weather": [{ "main": "Clear", "description": "clear sky" }]
                },
                {
                    "dt": 1780423200,
                    "temp": { "min": 50.0, "max": 64.0, "day": 60.0 },
                    "humidity": 88,
                    "speed": 18.0,
                    "rain": 12.7,
                    "weather": [{ "main": "Rain", "description": "moderate rain" }]
                }
            ]
        })
    }

    #[test]
    fn test_parse_daily_forecast() {
        let days = parse_daily_forecast(&sample_response()).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(days[0].condition, WeatherCondition::Clear);
        assert_eq!(days[0].precipitation, 0.0);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 6, 2).unwrap());
        assert_eq!(days[1].condition, WeatherCondition::Rain);
        assert!((days[1].precipitation - 0.5).abs() < 1e-9);
        assert_eq!(days[1].description, "moderate rain");
    }

    #[test]
    fn test_parse_daily_forecast_bad_structure() {
        let err = parse_daily_forecast(&serde_json::json!({ "cod": "401" })).unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }

    #[test]
    fn test_parse_day_without_weather_entry() {
        let json = serde_json::json!({
            "list": [{
                "dt": 1780336800,
                "temp": { "min": 55.0, "max": 78.0, "day": 72.5 },
                "humidity": 40,
                "speed": 6.5,
                "weather": []
            }]
        });
        let days = parse_daily_forecast(&json).unwrap();
        assert_eq!(days[0].condition, WeatherCondition::Clear);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_daily_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .and(query_param("q", "Denver, CO"))
            .and(query_param("units", "imperial"))
            .and(query_param("cnt", "7"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(Some("test-key".to_string()), &server.uri()).unwrap();
        let days = client.fetch_forecast("Denver, CO", 7).await.unwrap();
        assert_eq!(days.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_daily_clamps_day_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .and(query_param("cnt", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(Some("k".to_string()), &server.uri()).unwrap();
        assert!(client.fetch_daily("Austin, TX", 40).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_daily_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = OpenWeatherMapClient::new(Some("bad".to_string()), &server.uri()).unwrap();
        let err = client.fetch_daily("Denver, CO", 7).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_fetch_daily_without_key() {
        let client = OpenWeatherMapClient::new(None, OWM_DEFAULT_BASE_URL).unwrap();
        assert!(!client.has_api_key());
        let err = client.fetch_daily("Denver, CO", 7).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
