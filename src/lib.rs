//! `WeatherCheck` - weather-by-location lookups
//!
//! This library resolves free-text location names to coordinates, queries an
//! OpenWeatherMap-style provider and normalizes the answer into current
//! conditions and a five-day forecast.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod service;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::{ResolverStrategy, WeatherCheckConfig};
pub use error::WeatherCheckError;
pub use http::{HttpFetcher, ReqwestFetcher};
pub use location_resolver::{
    GeocodingLocationResolver, LocationResolver, LocationStore, TableLocationResolver,
    canonicalize_location_name,
};
pub use models::{Coordinates, CurrentWeather, DayOfWeek, LocationRecord, WeatherForecastEntry};
pub use service::WeatherService;
pub use weather::{MAX_FORECAST_DAYS, WeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherCheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
