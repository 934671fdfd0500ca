//! Weather provider client
//!
//! Calls the provider's current weather and forecast endpoints for a resolved
//! location and maps the nested response bodies into flat domain records.

use crate::http::HttpFetcher;
use crate::models::weather::kelvin_to_whole_celsius;
use crate::models::{CurrentWeather, DayOfWeek, LocationRecord, WeatherForecastEntry};
use crate::{Result, WeatherCheckError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Forecasts never cover more distinct days than this
pub const MAX_FORECAST_DAYS: usize = 5;

/// Client for the provider's `/weather` and `/forecast` endpoints
pub struct WeatherClient {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint_url(&self, endpoint: &str, location: &LocationRecord) -> String {
        format!(
            "{}/{}?lat={}&lon={}&appid={}",
            self.base_url,
            endpoint,
            location.coordinates.latitude,
            location.coordinates.longitude,
            self.api_key
        )
    }

    /// Current conditions for a resolved location
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn get_current(&self, location: &LocationRecord) -> Result<CurrentWeather> {
        info!(
            "Getting current weather for coordinates: {}",
            location.coordinates.format()
        );
        let start_time = Instant::now();

        let body = self
            .fetcher
            .get_text(&self.endpoint_url("weather", location))
            .await?;
        let response: openweather::CurrentWeatherResponse = serde_json::from_str(&body)?;
        let current = response.into_current(&location.name)?;

        debug!(
            "Retrieved current weather in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(current)
    }

    /// Up to [`MAX_FORECAST_DAYS`] entries, one per distinct day label
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn get_forecast(&self, location: &LocationRecord) -> Result<Vec<WeatherForecastEntry>> {
        info!(
            "Getting forecast for coordinates: {}",
            location.coordinates.format()
        );
        let start_time = Instant::now();

        let body = self
            .fetcher
            .get_text(&self.endpoint_url("forecast", location))
            .await?;
        let response: openweather::ForecastResponse = serde_json::from_str(&body)?;
        let raw_entries = response.list.len();
        let forecast = collapse_forecast_days(&location.name, response.list)?;

        debug!(
            "Collapsed {} provider entries into {} days in {:.3}s",
            raw_entries,
            forecast.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(forecast)
    }
}

/// Keep the first entry seen for each day label, in provider order, and stop
/// once [`MAX_FORECAST_DAYS`] labels are collected. Entries after that point
/// are never parsed.
pub fn collapse_forecast_days(
    location: &str,
    items: impl IntoIterator<Item = serde_json::Value>,
) -> Result<Vec<WeatherForecastEntry>> {
    let mut seen_days = HashSet::new();
    let mut forecast = Vec::with_capacity(MAX_FORECAST_DAYS);

    for item in items {
        let item: openweather::ForecastItem = serde_json::from_value(item)?;
        let day = DayOfWeek::from_unix_timestamp(item.dt);
        if !seen_days.insert(day) {
            continue;
        }

        forecast.push(item.into_entry(location, day)?);
        if forecast.len() == MAX_FORECAST_DAYS {
            break;
        }
    }

    Ok(forecast)
}

/// Provider response structures
mod openweather {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct MainReadings {
        /// Kelvin
        pub temp: f64,
        pub humidity: i32,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindReadings {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub id: i32,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub main: MainReadings,
        pub wind: WindReadings,
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<serde_json::Value>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        pub main: MainReadings,
        pub wind: WindReadings,
        pub weather: Vec<Condition>,
    }

    fn primary_condition(weather: Vec<Condition>) -> Result<Condition> {
        weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherCheckError::malformed("response has an empty `weather` array"))
    }

    impl CurrentWeatherResponse {
        pub fn into_current(self, location: &str) -> Result<CurrentWeather> {
            let condition = primary_condition(self.weather)?;
            Ok(CurrentWeather {
                location: location.to_string(),
                id: condition.id,
                temperature: kelvin_to_whole_celsius(self.main.temp),
                humidity: self.main.humidity,
                wind_speed: self.wind.speed,
                description: condition.description,
            })
        }
    }

    impl ForecastItem {
        pub fn into_entry(self, location: &str, day: DayOfWeek) -> Result<WeatherForecastEntry> {
            let timestamp = DateTime::<Utc>::from_timestamp(self.dt, 0).ok_or_else(|| {
                WeatherCheckError::malformed(format!("timestamp {} is out of range", self.dt))
            })?;
            let condition = primary_condition(self.weather)?;

            Ok(WeatherForecastEntry {
                location: location.to_string(),
                day,
                timestamp,
                id: condition.id,
                temperature: kelvin_to_whole_celsius(self.main.temp),
                humidity: self.main.humidity,
                wind_speed: self.wind.speed,
                description: condition.description,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const FIRST_DT: i64 = 1_687_024_800;

    fn forecast_item(dt: i64, temp: f64, description: &str, id: i32) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {"temp": temp, "humidity": 80, "pressure": 1012},
            "wind": {"speed": 4.8, "deg": 200},
            "weather": [{"id": id, "main": "Clouds", "description": description, "icon": "04d"}]
        })
    }

    fn three_hourly(start: i64, count: i64) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| forecast_item(start + i * 3 * 3600, 290.0 + i as f64 * 0.1, "rain", 500))
            .collect()
    }

    #[test]
    fn test_collapse_keeps_first_entry_per_day() {
        // 40 entries from 18:00 UTC reach six distinct labels
        let forecast = collapse_forecast_days("London", three_hourly(FIRST_DT, 40)).unwrap();

        assert_eq!(forecast.len(), MAX_FORECAST_DAYS);
        let days: Vec<&str> = forecast.iter().map(|entry| entry.day.as_str()).collect();
        assert_eq!(days, ["Sun", "Mon", "Tue", "Wed", "Thu"]);

        // "Mon" starts two entries later, at the next UTC midnight
        assert_eq!(forecast[0].timestamp.timestamp(), FIRST_DT);
        assert_eq!(forecast[1].timestamp.timestamp(), FIRST_DT + 6 * 3600);
        assert!(forecast.iter().all(|entry| entry.location == "London"));
    }

    #[test]
    fn test_collapse_fewer_days_than_cap() {
        let forecast = collapse_forecast_days("London", three_hourly(FIRST_DT, 12)).unwrap();
        let days: Vec<DayOfWeek> = forecast.iter().map(|entry| entry.day).collect();
        assert_eq!(days, [DayOfWeek::Sun, DayOfWeek::Mon, DayOfWeek::Tue]);
    }

    #[test]
    fn test_collapse_dedupes_by_label_not_date() {
        // Same weekday label one week apart is treated as already seen
        let items = vec![
            forecast_item(FIRST_DT, 294.31, "first", 801),
            forecast_item(FIRST_DT + 7 * 86_400, 280.0, "next week", 500),
        ];
        let forecast = collapse_forecast_days("London", items).unwrap();
        assert_eq!(forecast.len(), 1);
        assert_eq!(forecast[0].description, "first");
        assert_eq!(forecast[0].temperature, 21);
    }

    #[test]
    fn test_collapse_stops_before_parsing_trailing_entries() {
        let mut items = three_hourly(FIRST_DT, 40);
        items.push(json!({"garbage": true}));
        let forecast = collapse_forecast_days("London", items).unwrap();
        assert_eq!(forecast.len(), MAX_FORECAST_DAYS);
    }

    #[test]
    fn test_collapse_malformed_entry_fails() {
        let items = vec![json!({"dt": FIRST_DT, "main": {"temp": 290.0}})];
        let err = collapse_forecast_days("London", items).unwrap_err();
        assert!(matches!(err, WeatherCheckError::MalformedResponse { .. }));
    }

    #[test]
    fn test_collapse_empty_weather_array_fails() {
        let items = vec![json!({
            "dt": FIRST_DT,
            "main": {"temp": 290.0, "humidity": 50},
            "wind": {"speed": 1.0},
            "weather": []
        })];
        let err = collapse_forecast_days("London", items).unwrap_err();
        assert!(matches!(err, WeatherCheckError::MalformedResponse { .. }));
    }

    struct FixedFetcher {
        body: String,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpFetcher for FixedFetcher {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    fn client_with_body(body: serde_json::Value) -> (WeatherClient, Arc<FixedFetcher>) {
        let fetcher = Arc::new(FixedFetcher {
            body: body.to_string(),
            urls: Mutex::new(Vec::new()),
        });
        let client = WeatherClient::new(fetcher.clone(), "https://api.example/data/2.5/", "key12345");
        (client, fetcher)
    }

    fn london() -> LocationRecord {
        LocationRecord::new("London", 51.50853, -0.12574)
    }

    #[tokio::test]
    async fn test_get_current_maps_fields() {
        let (client, fetcher) = client_with_body(json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 801, "main": "Clouds", "description": "Few clouds", "icon": "02d"}],
            "main": {"temp": 294.31, "feels_like": 294.0, "humidity": 53, "pressure": 1015},
            "wind": {"speed": 7.2, "deg": 240},
            "name": "London"
        }));

        let current = client.get_current(&london()).await.unwrap();
        assert_eq!(
            current,
            CurrentWeather {
                location: "London".to_string(),
                id: 801,
                temperature: 21,
                humidity: 53,
                wind_speed: 7.2,
                description: "Few clouds".to_string(),
            }
        );

        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://api.example/data/2.5/weather?lat=51.50853&lon=-0.12574&appid=key12345"]
        );
    }

    #[tokio::test]
    async fn test_get_current_missing_field() {
        let (client, _) = client_with_body(json!({
            "weather": [{"id": 801, "description": "Few clouds"}],
            "main": {"temp": 294.31},
            "wind": {"speed": 7.2}
        }));
        let err = client.get_current(&london()).await.unwrap_err();
        assert!(matches!(err, WeatherCheckError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_get_forecast_requests_forecast_endpoint() {
        let (client, fetcher) = client_with_body(json!({
            "cod": "200",
            "cnt": 40,
            "list": three_hourly(FIRST_DT, 40)
        }));

        let forecast = client.get_forecast(&london()).await.unwrap();
        assert_eq!(forecast.len(), 5);
        assert!(fetcher.urls.lock().unwrap()[0].starts_with("https://api.example/data/2.5/forecast?lat="));
    }
}
