//! Weather lookup service
//!
//! Ties a [`LocationResolver`] to a [`WeatherClient`] and is the fail-soft
//! boundary of the crate: lookups answer `None` or an empty forecast instead
//! of an error, and the cause is logged.

use crate::config::{ResolverStrategy, WeatherCheckConfig};
use crate::http::{HttpFetcher, ReqwestFetcher};
use crate::location_resolver::{
    GeocodingLocationResolver, LocationResolver, LocationStore, TableLocationResolver,
};
use crate::models::{CurrentWeather, WeatherForecastEntry};
use crate::weather::WeatherClient;
use crate::WeatherCheckError;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Resolves locations and fetches their weather
pub struct WeatherService {
    resolver: Arc<dyn LocationResolver>,
    client: WeatherClient,
}

impl WeatherService {
    #[must_use]
    pub fn new(resolver: Arc<dyn LocationResolver>, client: WeatherClient) -> Self {
        Self { resolver, client }
    }

    /// Wire the service from configuration, loading the location dataset
    /// when the table strategy is active
    pub fn from_config(config: &WeatherCheckConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(Duration::from_secs(
            config.weather.timeout_seconds.into(),
        ))?);

        let resolver: Arc<dyn LocationResolver> = match config.locations.strategy {
            ResolverStrategy::Table => {
                let store = LocationStore::load_from_path(&config.locations.dataset_path)
                    .with_context(|| {
                        format!(
                            "Failed to load location dataset from {}",
                            config.locations.dataset_path
                        )
                    })?;
                Arc::new(TableLocationResolver::new(Arc::new(store)))
            }
            ResolverStrategy::Geocode => Arc::new(GeocodingLocationResolver::new(
                fetcher.clone(),
                config.weather.geocoding_base_url.clone(),
                api_key.clone(),
            )),
        };
        info!("Using {:?} location resolution", config.locations.strategy);

        let client = WeatherClient::new(fetcher, config.weather.base_url.clone(), api_key);
        Ok(Self::new(resolver, client))
    }

    /// Current weather for a free-text location, `None` when unavailable
    #[instrument(skip(self))]
    pub async fn current_weather(&self, location: &str) -> Option<CurrentWeather> {
        match self.lookup_current(location).await {
            Ok(current) => {
                info!("Current weather for {}: {}", current.location, current.description);
                Some(current)
            }
            Err(e) => {
                log_lookup_failure("current weather", location, &e);
                None
            }
        }
    }

    /// Forecast for a free-text location, empty when unavailable
    #[instrument(skip(self))]
    pub async fn forecast(&self, location: &str) -> Vec<WeatherForecastEntry> {
        match self.lookup_forecast(location).await {
            Ok(forecast) => {
                info!("Forecast for '{}' covers {} days", location, forecast.len());
                forecast
            }
            Err(e) => {
                log_lookup_failure("forecast", location, &e);
                Vec::new()
            }
        }
    }

    async fn lookup_current(&self, location: &str) -> crate::Result<CurrentWeather> {
        let record = self.resolver.resolve(location).await?;
        self.client.get_current(&record).await
    }

    async fn lookup_forecast(&self, location: &str) -> crate::Result<Vec<WeatherForecastEntry>> {
        let record = self.resolver.resolve(location).await?;
        self.client.get_forecast(&record).await
    }
}

fn log_lookup_failure(kind: &str, location: &str, err: &WeatherCheckError) {
    if err.is_not_found() {
        warn!("No {} for '{}': {}", kind, location, err);
    } else {
        error!("Error retrieving {} for '{}': {}", kind, location, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationRecord;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned responses keyed by endpoint, counting every request
    struct ScriptedFetcher {
        current: Option<String>,
        forecast: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(current: Option<serde_json::Value>, forecast: Option<serde_json::Value>) -> Self {
            Self {
                current: current.map(|v| v.to_string()),
                forecast: forecast.map(|v| v.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpFetcher for ScriptedFetcher {
        async fn get_text(&self, url: &str) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = if url.contains("/weather?") {
                self.current.clone()
            } else if url.contains("/forecast?") {
                self.forecast.clone()
            } else {
                None
            };
            body.ok_or_else(|| WeatherCheckError::provider_unreachable("connection refused"))
        }
    }

    fn service(fetcher: Arc<ScriptedFetcher>) -> WeatherService {
        let store = LocationStore::from_records([LocationRecord::new("London", 51.50853, -0.12574)]);
        let resolver = Arc::new(TableLocationResolver::new(Arc::new(store)));
        let client = WeatherClient::new(fetcher, "https://api.example/data/2.5", "key12345");
        WeatherService::new(resolver, client)
    }

    fn london_current() -> serde_json::Value {
        json!({
            "weather": [{"id": 801, "description": "Few clouds"}],
            "main": {"temp": 294.31, "humidity": 53},
            "wind": {"speed": 7.2}
        })
    }

    #[tokio::test]
    async fn test_current_weather_end_to_end() {
        let fetcher = Arc::new(ScriptedFetcher::new(Some(london_current()), None));
        let service = service(fetcher.clone());

        let current = service.current_weather("london").await.unwrap();
        assert_eq!(current.location, "London");
        assert_eq!(current.temperature, 21);
        assert_eq!(current.humidity, 53);
        assert_eq!(current.wind_speed, 7.2);
        assert_eq!(current.description, "Few clouds");
        assert_eq!(current.id, 801);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_location_makes_no_requests() {
        let fetcher = Arc::new(ScriptedFetcher::new(Some(london_current()), Some(json!({"list": []}))));
        let service = service(fetcher.clone());

        assert!(service.current_weather("Par1s").await.is_none());
        assert!(service.forecast("Par1s").await.is_empty());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_soft() {
        let fetcher = Arc::new(ScriptedFetcher::new(None, None));
        let service = service(fetcher.clone());

        assert!(service.current_weather("London").await.is_none());
        assert!(service.forecast("London").await.is_empty());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_response_is_soft() {
        let fetcher = Arc::new(ScriptedFetcher::new(
            Some(json!({"main": "not an object"})),
            Some(json!({"list": "nope"})),
        ));
        let service = service(fetcher);

        assert!(service.current_weather("London").await.is_none());
        assert!(service.forecast("London").await.is_empty());
    }

    #[tokio::test]
    async fn test_forecast_collapses_days() {
        let list: Vec<serde_json::Value> = (0..40)
            .map(|i| {
                json!({
                    "dt": 1_687_024_800 + i * 10_800,
                    "main": {"temp": 290.0, "humidity": 70},
                    "wind": {"speed": 3.0},
                    "weather": [{"id": 500, "description": "light rain"}]
                })
            })
            .collect();
        let fetcher = Arc::new(ScriptedFetcher::new(None, Some(json!({"list": list}))));
        let service = service(fetcher);

        let forecast = service.forecast("LONDON").await;
        assert_eq!(forecast.len(), 5);
        assert_eq!(forecast[0].day.as_str(), "Sun");
        assert!(forecast.iter().all(|entry| entry.location == "London"));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = WeatherCheckConfig::default();
        assert!(WeatherService::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_geocode_strategy() {
        let mut config = WeatherCheckConfig::default();
        config.weather.api_key = Some("valid_api_key_123".to_string());
        config.locations.strategy = ResolverStrategy::Geocode;
        config.locations.dataset_path = "/does/not/exist.json".to_string();
        assert!(WeatherService::from_config(&config).is_ok());
    }

    #[test]
    fn test_from_config_missing_dataset() {
        let mut config = WeatherCheckConfig::default();
        config.weather.api_key = Some("valid_api_key_123".to_string());
        config.locations.dataset_path = "/does/not/exist.json".to_string();
        let err = WeatherService::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("Failed to load location dataset"));
    }
}
