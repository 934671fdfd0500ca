//! Current weather and forecast entry models, plus the unit helpers they rely on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;
const KELVIN_OFFSET: f64 = 273.15;

/// Current conditions for a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Location name as resolved
    pub location: String,
    /// Provider condition code (800 = clear, 5xx = rain, ...)
    pub id: i32,
    /// Temperature in whole degrees Celsius
    pub temperature: i32,
    /// Relative humidity in percent
    pub humidity: i32,
    /// Wind speed as reported by the provider
    pub wind_speed: f64,
    pub description: String,
}

/// One day of a forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherForecastEntry {
    pub location: String,
    pub day: DayOfWeek,
    /// Provider timestamp of the entry this day was taken from
    pub timestamp: DateTime<Utc>,
    pub id: i32,
    pub temperature: i32,
    pub humidity: i32,
    pub wind_speed: f64,
    pub description: String,
}

/// Day-of-week label used by forecast entries
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// Map an index in `0..7` to a label, 0 being `Mon`
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        match index % 7 {
            0 => DayOfWeek::Mon,
            1 => DayOfWeek::Tue,
            2 => DayOfWeek::Wed,
            3 => DayOfWeek::Thu,
            4 => DayOfWeek::Fri,
            5 => DayOfWeek::Sat,
            _ => DayOfWeek::Sun,
        }
    }

    /// Label for a Unix timestamp: `floor(secs / 86400 + 4) mod 7`
    #[must_use]
    pub fn from_unix_timestamp(secs: i64) -> Self {
        let index = (secs.div_euclid(SECONDS_PER_DAY) + 4).rem_euclid(7);
        // rem_euclid(7) keeps the value in 0..7
        Self::from_index(index as u8)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert temperature from Kelvin to Celsius
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Round half up: `floor(x + 0.5)`, so -2.5 becomes -2 and 2.5 becomes 3
#[must_use]
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Kelvin to whole degrees Celsius
#[must_use]
pub fn kelvin_to_whole_celsius(kelvin: f64) -> i32 {
    round_half_up(kelvin_to_celsius(kelvin))
}

impl CurrentWeather {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }
}

impl WeatherForecastEntry {
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_kelvin_to_whole_celsius() {
        assert_eq!(kelvin_to_whole_celsius(294.31), 21);
        assert_eq!(kelvin_to_whole_celsius(293.15), 20);
        assert_eq!(kelvin_to_whole_celsius(273.15), 0);
    }

    #[rstest]
    #[case(2.5, 3)]
    #[case(2.4, 2)]
    #[case(-2.5, -2)]
    #[case(-2.6, -3)]
    #[case(0.0, 0)]
    fn test_round_half_up(#[case] value: f64, #[case] expected: i32) {
        assert_eq!(round_half_up(value), expected);
    }

    #[rstest]
    #[case(1_687_024_800, DayOfWeek::Sun)]
    #[case(0, DayOfWeek::Fri)]
    #[case(86_399, DayOfWeek::Fri)]
    #[case(86_400, DayOfWeek::Sat)]
    #[case(-1, DayOfWeek::Thu)]
    fn test_day_from_unix_timestamp(#[case] secs: i64, #[case] expected: DayOfWeek) {
        assert_eq!(DayOfWeek::from_unix_timestamp(secs), expected);
    }

    #[test]
    fn test_day_labels_cycle_weekly() {
        let start = 1_687_024_800;
        let labels: Vec<&str> = (0..7)
            .map(|day| DayOfWeek::from_unix_timestamp(start + day * 86_400).as_str())
            .collect();
        assert_eq!(labels, ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    }

    #[test]
    fn test_day_serializes_as_label() {
        let json = serde_json::to_string(&DayOfWeek::Wed).unwrap();
        assert_eq!(json, "\"Wed\"");
        assert_eq!(DayOfWeek::Wed.to_string(), "Wed");
    }
}
