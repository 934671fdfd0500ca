use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    VERSION,
    models::{CurrentWeather, WeatherForecastEntry, icon_class},
    service::WeatherService,
};

pub type AppState = Arc<WeatherService>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCurrentWeather {
    pub location: String,
    pub id: i32,
    pub temperature: i32,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiForecastDay {
    pub location: String,
    pub day: String,
    pub timestamp: i64,
    pub id: i32,
    pub temperature: i32,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl From<CurrentWeather> for ApiCurrentWeather {
    fn from(current: CurrentWeather) -> Self {
        Self {
            icon: icon_class(current.id).to_string(),
            location: current.location,
            id: current.id,
            temperature: current.temperature,
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            description: current.description,
        }
    }
}

impl From<WeatherForecastEntry> for ApiForecastDay {
    fn from(entry: WeatherForecastEntry) -> Self {
        Self {
            icon: icon_class(entry.id).to_string(),
            location: entry.location,
            day: entry.day.to_string(),
            timestamp: entry.timestamp.timestamp(),
            id: entry.id,
            temperature: entry.temperature,
            humidity: entry.humidity,
            wind_speed: entry.wind_speed,
            description: entry.description,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn not_found(kind: &str, location: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: format!("No {kind} available for '{location}'"),
        }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather/{location}", get(get_current_weather))
        .route("/forecast/{location}", get(get_forecast))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

async fn get_current_weather(
    State(service): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<ApiCurrentWeather> {
    service
        .current_weather(&location)
        .await
        .map(|current| Json(current.into()))
        .ok_or_else(|| not_found("weather data", &location))
}

async fn get_forecast(
    State(service): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Vec<ApiForecastDay>> {
    let forecast = service.forecast(&location).await;
    if forecast.is_empty() {
        return Err(not_found("forecast", &location));
    }
    Ok(Json(forecast.into_iter().map(ApiForecastDay::from).collect()))
}
