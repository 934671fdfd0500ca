//! Data models for WeatherCheck
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates and named location records
//! - Weather: current conditions, forecast entries and unit helpers
//! - Icon: condition code to icon class mapping

pub mod icon;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use icon::icon_class;
pub use location::{Coordinates, LocationRecord};
pub use weather::{CurrentWeather, DayOfWeek, WeatherForecastEntry};
