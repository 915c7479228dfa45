use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;
use crate::services::catalog::ProjectCatalog;
use crate::services::openweathermap::OWM_DEFAULT_BASE_URL;
use crate::services::scheduler::SchedulerSettings;
use crate::services::suitability::WeatherConstraints;

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, for log shippers
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(AppError::Config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Without a key every request is served from the simulated forecast.
    pub openweathermap_api_key: Option<String>,
    pub openweathermap_base_url: String,
    pub port: u16,
    /// Optional JSON file overriding the built-in project catalog.
    pub catalog_path: Option<PathBuf>,
    pub forecast_timeout_secs: u64,
    pub simulation_seed: u64,
    pub log_format: LogFormat,
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, AppError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| {
            AppError::Config(format!("{} must be a valid number, got '{}'", name, v))
        }),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            openweathermap_api_key: non_empty("OPENWEATHERMAP_API_KEY"),
            openweathermap_base_url: non_empty("OPENWEATHERMAP_BASE_URL")
                .unwrap_or_else(|| OWM_DEFAULT_BASE_URL.to_string()),
            port: parse_var("PORT", non_empty("PORT"), 8080)?,
            catalog_path: non_empty("CATALOG_PATH").map(PathBuf::from),
            forecast_timeout_secs: parse_var(
                "FORECAST_TIMEOUT_SECS",
                non_empty("FORECAST_TIMEOUT_SECS"),
                10,
            )?,
            simulation_seed: parse_var("SIMULATION_SEED", non_empty("SIMULATION_SEED"), 42)?,
            log_format: non_empty("LOG_FORMAT")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// The catalog and weather thresholds to schedule with.
    pub fn load_catalog(&self) -> Result<(ProjectCatalog, WeatherConstraints), AppError> {
        match &self.catalog_path {
            Some(path) => {
                let (catalog, constraints) = ProjectCatalog::from_json_file(path)?;
                tracing::info!("Loaded project catalog from {}", path.display());
                Ok((catalog, constraints.unwrap_or_default()))
            }
            None => Ok((ProjectCatalog::default(), WeatherConstraints::default())),
        }
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            forecast_timeout: Duration::from_secs(self.forecast_timeout_secs),
            simulation_seed: self.simulation_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.openweathermap_api_key.is_none());
        assert_eq!(config.openweathermap_base_url, OWM_DEFAULT_BASE_URL);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.forecast_timeout_secs, 10);
        assert_eq!(config.simulation_seed, 42);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENWEATHERMAP_API_KEY", "abc123"),
            ("PORT", "9000"),
            ("FORECAST_TIMEOUT_SECS", "3"),
            ("SIMULATION_SEED", "7"),
        ])
        .unwrap();

        assert_eq!(config.openweathermap_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.scheduler_settings().forecast_timeout,
            Duration::from_secs(3)
        );
        assert_eq!(config.scheduler_settings().simulation_seed, 7);
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let config = config_from(&[("OPENWEATHERMAP_API_KEY", "  ")]).unwrap();
        assert!(config.openweathermap_api_key.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_json_log_format() {
        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_log_format() {
        let err = config_from(&[("LOG_FORMAT", "xml")]).unwrap_err();
        assert!(err.to_string().contains("LOG_FORMAT"));
    }

    #[test]
    fn test_load_default_catalog() {
        let config = config_from(&[]).unwrap();
        let (catalog, constraints) = config.load_catalog().unwrap();
        assert_eq!(catalog, ProjectCatalog::default());
        assert_eq!(constraints, WeatherConstraints::default());
    }

    #[test]
    fn test_load_missing_catalog_file() {
        let config = config_from(&[("CATALOG_PATH", "/nonexistent/catalog.json")]).unwrap();
        assert!(matches!(config.load_catalog(), Err(AppError::Config(_))));
    }
}
